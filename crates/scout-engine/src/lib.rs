use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Response as HttpResponse;
use scout_contracts::events::{EventPayload, EventWriter};
use serde_json::Value;
use tracing::warn;

mod config;
mod generator;
mod search;
mod session;
mod text_models;

pub use config::EngineConfig;
pub use generator::{GenerateError, JobGenerator};
pub use search::{
    default_search_registry, CandidateSearch, DryrunSearch, RapidApiSearch,
    SearchProviderRegistry,
};
pub use session::CandidateSession;
pub use text_models::{
    default_text_model_registry, provider_for_model, DryrunTextModel, GeminiTextModel, TextModel,
    TextModelRegistry, TextRequest,
};

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// For events whose loss should not fail the operation that produced them.
fn emit_or_warn(events: &EventWriter, event_type: &str, payload: EventPayload) {
    if let Err(err) = events.emit(event_type, payload) {
        warn!(event = event_type, "event log write failed: {err:#}");
    }
}

/// Per-request timeout; values `Duration` cannot hold fall back to the
/// default.
fn request_timeout(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds)
        .unwrap_or_else(|_| Duration::from_secs_f64(config::DEFAULT_REQUEST_TIMEOUT_S))
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
