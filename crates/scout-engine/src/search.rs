use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use scout_contracts::candidates::{
    candidates_from_response, Candidate, CompanyDetails, CurrentPosition, SearchRequest,
};
use tracing::info;

use crate::{request_timeout, response_json_or_error, EngineConfig};

pub trait CandidateSearch: Send + Sync {
    fn name(&self) -> &str;
    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>>;
}

#[derive(Default)]
pub struct SearchProviderRegistry {
    providers: BTreeMap<String, Arc<dyn CandidateSearch>>,
}

impl SearchProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: CandidateSearch + 'static>(&mut self, provider: P) {
        self.providers
            .insert(provider.name().to_string(), Arc::new(provider));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CandidateSearch>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }
}

pub fn default_search_registry(config: &EngineConfig) -> SearchProviderRegistry {
    let mut providers = SearchProviderRegistry::new();
    providers.register(DryrunSearch);
    providers.register(RapidApiSearch::new(config));
    providers
}

/// Sales Navigator person search behind RapidAPI.
pub struct RapidApiSearch {
    host: String,
    api_key: Option<String>,
    timeout_s: f64,
    http: HttpClient,
}

impl RapidApiSearch {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            host: config.rapidapi_host.clone(),
            api_key: config.rapidapi_key.clone(),
            timeout_s: config.request_timeout_s,
            http: HttpClient::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("https://{}/premium_search_person", self.host)
    }
}

impl CandidateSearch for RapidApiSearch {
    fn name(&self) -> &str {
        "rapidapi"
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>> {
        let endpoint = self.endpoint();
        info!(
            filters = request.filters.len(),
            page = request.page,
            "searching candidates"
        );
        let mut builder = self
            .http
            .post(&endpoint)
            .header("x-rapidapi-host", self.host.as_str())
            .header(CONTENT_TYPE, "application/json")
            .timeout(request_timeout(self.timeout_s))
            .json(request);
        if let Some(api_key) = self.api_key.as_deref() {
            builder = builder.header("x-rapidapi-key", api_key);
        }
        let response = builder
            .send()
            .with_context(|| format!("candidate search request failed ({endpoint})"))?;
        let payload = response_json_or_error("RapidAPI", response)?;
        candidates_from_response(&payload)
    }
}

/// Offline search returning a fixed pair of candidates.
pub struct DryrunSearch;

impl DryrunSearch {
    pub fn sample_candidates() -> Vec<Candidate> {
        vec![
            sample_candidate(
                "John",
                "John Smith",
                "San Francisco, California, United States",
                "https://www.linkedin.com/in/john-smith",
                "Senior MERN Stack Developer with 8+ years of experience building scalable web applications.",
                "Senior MERN Stack Developer",
                "Tech Innovators Inc",
                "Information Technology & Services",
                "San Francisco, CA",
            ),
            sample_candidate(
                "Sarah",
                "Sarah Johnson",
                "New York City, New York, United States",
                "https://www.linkedin.com/in/sarah-johnson",
                "Full-Stack Developer specializing in React and Node.js.",
                "Lead Full-Stack Developer",
                "Digital Solutions Co",
                "Software Development",
                "New York, NY",
            ),
        ]
    }
}

impl CandidateSearch for DryrunSearch {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn search(&self, _request: &SearchRequest) -> Result<Vec<Candidate>> {
        Ok(Self::sample_candidates())
    }
}

#[allow(clippy::too_many_arguments)]
fn sample_candidate(
    first_name: &str,
    full_name: &str,
    geo_region: &str,
    navigation_url: &str,
    summary: &str,
    title: &str,
    company: &str,
    industry: &str,
    location: &str,
) -> Candidate {
    Candidate {
        first_name: first_name.to_string(),
        full_name: full_name.to_string(),
        geo_region: geo_region.to_string(),
        profile_picture_display_image: None,
        navigation_url: navigation_url.to_string(),
        summary: Some(summary.to_string()),
        current_position: Some(CurrentPosition {
            title: Some(title.to_string()),
            company_name: Some(company.to_string()),
            company_urn_resolution_result: Some(CompanyDetails {
                company_picture_display_image: None,
                name: Some(company.to_string()),
                industry: Some(industry.to_string()),
                location: Some(location.to_string()),
            }),
        }),
    }
}

#[cfg(test)]
mod tests {
    use scout_contracts::candidates::SearchRequest;

    use super::{default_search_registry, DryrunSearch, RapidApiSearch};
    use crate::EngineConfig;

    #[test]
    fn registry_lists_providers() {
        let registry = default_search_registry(&EngineConfig::default());
        assert_eq!(registry.names(), vec!["dryrun", "rapidapi"]);
        assert!(registry.get("rapidapi").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn rapidapi_endpoint_uses_configured_host() {
        let config = EngineConfig {
            rapidapi_host: "people.example.test".to_string(),
            ..EngineConfig::default()
        };
        assert_eq!(
            RapidApiSearch::new(&config).endpoint(),
            "https://people.example.test/premium_search_person"
        );
    }

    #[test]
    fn dryrun_search_returns_samples() -> anyhow::Result<()> {
        let registry = default_search_registry(&EngineConfig::default());
        let provider = registry
            .get("dryrun")
            .ok_or_else(|| anyhow::anyhow!("dryrun provider missing"))?;
        let candidates = provider.search(&SearchRequest {
            account_number: 1,
            page: 1,
            filters: Vec::new(),
        })?;
        assert_eq!(candidates, DryrunSearch::sample_candidates());
        assert_eq!(
            candidates[1].headline().as_deref(),
            Some("Lead Full-Stack Developer at Digital Solutions Co")
        );
        Ok(())
    }
}
