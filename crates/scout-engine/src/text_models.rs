use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{request_timeout, response_json_or_error, EngineConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
    pub max_output_tokens: u32,
}

pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;
    fn generate(&self, request: &TextRequest) -> Result<String>;
}

#[derive(Default)]
pub struct TextModelRegistry {
    providers: BTreeMap<String, Arc<dyn TextModel>>,
}

impl TextModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: TextModel + 'static>(&mut self, provider: P) {
        self.providers
            .insert(provider.name().to_string(), Arc::new(provider));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TextModel>> {
        self.providers.get(name).cloned()
    }

    /// Provider serving `model`, see [`provider_for_model`].
    pub fn for_model(&self, model: &str) -> Result<Arc<dyn TextModel>> {
        let provider = provider_for_model(model);
        self.get(provider)
            .with_context(|| format!("no text provider '{provider}' for model '{model}'"))
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }
}

/// `dryrun*` models are served offline; everything else goes to Gemini.
pub fn provider_for_model(model: &str) -> &'static str {
    if model.trim().starts_with("dryrun") {
        "dryrun"
    } else {
        "gemini"
    }
}

pub fn default_text_model_registry(config: &EngineConfig) -> TextModelRegistry {
    let mut providers = TextModelRegistry::new();
    providers.register(DryrunTextModel);
    providers.register(GeminiTextModel::new(config));
    providers
}

/// Deterministic stand-in for the generator model. Echoes the user input
/// back as a fenced JSON reply in the shape the recruiter template asks for.
pub struct DryrunTextModel;

impl DryrunTextModel {
    fn user_input(prompt: &str) -> String {
        let mut lines = prompt.lines().skip_while(|line| !line.starts_with("User Input:"));
        let mut input = lines
            .next()
            .and_then(|line| line.strip_prefix("User Input:"))
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        for line in lines {
            if line.trim().is_empty() {
                break;
            }
            input.push(' ');
            input.push_str(line.trim());
        }
        if input.is_empty() {
            prompt.trim().to_string()
        } else {
            input
        }
    }
}

impl TextModel for DryrunTextModel {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate(&self, request: &TextRequest) -> Result<String> {
        let input = Self::user_input(&request.prompt);
        let role: String = input.chars().take(80).collect();
        let reply = json!({
            "job_description": format!(
                "Job Title: {role}\nLocation: Remote\nType: Full-Time\n\nWe are hiring: {input}"
            ),
            "filters": {
                "job_role": role,
                "positions": "1",
                "years_of_experience": "",
                "work_type": "Full-Time",
                "job_location": "Remote",
                "skills_tags": [],
                "search_tags": [],
            },
        });
        Ok(format!("```json\n{}\n```", serde_json::to_string_pretty(&reply)?))
    }
}

pub struct GeminiTextModel {
    api_base: String,
    api_key: Option<String>,
    timeout_s: f64,
    http: HttpClient,
}

impl GeminiTextModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            timeout_s: config.request_timeout_s,
            http: HttpClient::new(),
        }
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_payload(request: &TextRequest) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "maxOutputTokens": request.max_output_tokens,
            },
        })
    }

    /// Concatenates the text parts of the first candidate.
    fn extract_text(response_payload: &Value) -> Result<String> {
        let parts = response_payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let text = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<&str>>()
            .join("");
        if text.trim().is_empty() {
            if let Some(reason) = response_payload
                .get("promptFeedback")
                .and_then(|feedback| feedback.get("blockReason"))
                .and_then(Value::as_str)
            {
                bail!("Gemini blocked the prompt ({reason})");
            }
            bail!("Gemini returned no text");
        }
        Ok(text)
    }
}

impl TextModel for GeminiTextModel {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &TextRequest) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY not set");
        };
        let endpoint = self.endpoint_for_model(&request.model);
        info!(model = request.model.as_str(), "invoking Gemini");
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .timeout(request_timeout(self.timeout_s))
            .json(&Self::build_payload(request))
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        let response_payload = response_json_or_error("Gemini", response)?;
        let text = Self::extract_text(&response_payload)?;
        debug!(chars = text.len(), "Gemini reply received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        default_text_model_registry, provider_for_model, DryrunTextModel, GeminiTextModel,
        TextModel, TextRequest,
    };
    use crate::EngineConfig;
    use scout_contracts::jobs::parse_model_reply;
    use scout_contracts::prompts::build_job_prompt;

    fn request(prompt: String) -> TextRequest {
        TextRequest {
            model: "dryrun-text".to_string(),
            prompt,
            max_output_tokens: 2048,
        }
    }

    #[test]
    fn registry_routes_models_to_providers() -> anyhow::Result<()> {
        let registry = default_text_model_registry(&EngineConfig::default());
        assert_eq!(registry.names(), vec!["dryrun", "gemini"]);
        assert_eq!(registry.for_model("dryrun-text")?.name(), "dryrun");
        assert_eq!(registry.for_model("gemini-2.0-flash")?.name(), "gemini");
        assert_eq!(provider_for_model("  dryrun"), "dryrun");
        Ok(())
    }

    #[test]
    fn dryrun_reply_parses_as_job_posting() -> anyhow::Result<()> {
        let prompt = build_job_prompt("Senior Rust engineer", Some("remote only"));
        let reply = DryrunTextModel.generate(&request(prompt))?;
        assert!(reply.starts_with("```json"));
        let posting = parse_model_reply(&reply)?;
        assert!(posting
            .job_description
            .contains("Senior Rust engineer remote only"));
        assert_eq!(
            posting.filters.get("job_role"),
            Some(&scout_contracts::filters::FlatFilterValue::Text(
                "Senior Rust engineer remote only".to_string()
            ))
        );
        Ok(())
    }

    #[test]
    fn gemini_endpoint_accepts_prefixed_models() {
        let model = GeminiTextModel::new(&EngineConfig::default());
        assert_eq!(
            model.endpoint_for_model("gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            model.endpoint_for_model("models/gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn gemini_payload_carries_prompt_and_token_cap() {
        let payload = GeminiTextModel::build_payload(&TextRequest {
            model: "gemini-2.0-flash".to_string(),
            prompt: "hello".to_string(),
            max_output_tokens: 2048,
        });
        assert_eq!(payload["contents"][0]["parts"][0]["text"], json!("hello"));
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], json!(2048));
    }

    #[test]
    fn gemini_text_is_joined_from_first_candidate() -> anyhow::Result<()> {
        let payload = json!({
            "candidates": [
                {"content": {"parts": [{"text": "```json\n{"}, {"text": "}\n```"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(GeminiTextModel::extract_text(&payload)?, "```json\n{}\n```");
        Ok(())
    }

    #[test]
    fn gemini_empty_or_blocked_reply_is_an_error() {
        let blocked = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = GeminiTextModel::extract_text(&blocked).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
        assert!(GeminiTextModel::extract_text(&json!({"candidates": []})).is_err());
    }

    #[test]
    fn gemini_without_key_fails_before_network() {
        let model = GeminiTextModel::new(&EngineConfig::default());
        let err = model
            .generate(&TextRequest {
                model: "gemini-2.0-flash".to_string(),
                prompt: "x".to_string(),
                max_output_tokens: 16,
            })
            .unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
