use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filters::FilterCategory;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub first_name: String,
    pub full_name: String,
    pub geo_region: String,
    pub profile_picture_display_image: Option<String>,
    pub navigation_url: String,
    pub summary: Option<String>,
    pub current_position: Option<CurrentPosition>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentPosition {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub company_urn_resolution_result: Option<CompanyDetails>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyDetails {
    pub company_picture_display_image: Option<String>,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

impl Candidate {
    /// `"<title> at <company>"`, or whichever half is known.
    pub fn headline(&self) -> Option<String> {
        let position = self.current_position.as_ref()?;
        let title = position.title.as_deref().filter(|value| !value.is_empty());
        let company = position
            .company_name
            .as_deref()
            .filter(|value| !value.is_empty());
        match (title, company) {
            (Some(title), Some(company)) => Some(format!("{title} at {company}")),
            (Some(title), None) => Some(title.to_string()),
            (None, Some(company)) => Some(company.to_string()),
            (None, None) => None,
        }
    }
}

/// Body of the people-search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub account_number: u32,
    pub page: u32,
    pub filters: Vec<FilterCategory>,
}

/// Pulls the candidate list out of the `{"response": {"data": [...]}}`
/// envelope. Rows that do not decode as a candidate are skipped.
pub fn candidates_from_response(payload: &Value) -> anyhow::Result<Vec<Candidate>> {
    let Some(rows) = payload
        .get("response")
        .and_then(|response| response.get("data"))
        .and_then(Value::as_array)
    else {
        anyhow::bail!("search response has no response.data list");
    };
    Ok(rows
        .iter()
        .filter_map(|row| serde_json::from_value::<Candidate>(row.clone()).ok())
        .collect())
}
