use std::str::FromStr;

use tracing::warn;

use crate::non_empty_env;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(crate) const DEFAULT_REQUEST_TIMEOUT_S: f64 = 90.0;
const DEFAULT_RAPIDAPI_HOST: &str = "linkedin-sales-navigator-no-cookies-required.p.rapidapi.com";

/// Settings for the external collaborators, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub text_model: String,
    pub max_output_tokens: u32,
    pub request_timeout_s: f64,
    pub rapidapi_key: Option<String>,
    pub rapidapi_host: String,
    pub account_number: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            text_model: "gemini-2.0-flash".to_string(),
            max_output_tokens: 2048,
            request_timeout_s: DEFAULT_REQUEST_TIMEOUT_S,
            rapidapi_key: None,
            rapidapi_host: DEFAULT_RAPIDAPI_HOST.to_string(),
            account_number: 1,
        }
    }
}

impl EngineConfig {
    /// Reads `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), `GEMINI_API_BASE`,
    /// `SCOUT_TEXT_MODEL`, `SCOUT_MAX_OUTPUT_TOKENS`, `SCOUT_REQUEST_TIMEOUT`,
    /// `RAPIDAPI_KEY`, `RAPIDAPI_HOST` and `SCOUT_ACCOUNT_NUMBER`. Unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gemini_api_key: non_empty_env("GEMINI_API_KEY")
                .or_else(|| non_empty_env("GOOGLE_API_KEY")),
            gemini_api_base: non_empty_env("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_api_base),
            text_model: non_empty_env("SCOUT_TEXT_MODEL").unwrap_or(defaults.text_model),
            max_output_tokens: env_number("SCOUT_MAX_OUTPUT_TOKENS", defaults.max_output_tokens),
            request_timeout_s: timeout_seconds(env_number(
                "SCOUT_REQUEST_TIMEOUT",
                defaults.request_timeout_s,
            )),
            rapidapi_key: non_empty_env("RAPIDAPI_KEY"),
            rapidapi_host: non_empty_env("RAPIDAPI_HOST").unwrap_or(defaults.rapidapi_host),
            account_number: env_number("SCOUT_ACCOUNT_NUMBER", defaults.account_number),
        }
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }
}

/// Clamped to 5..=600; NaN and infinities fall back to the default.
fn timeout_seconds(value: f64) -> f64 {
    if !value.is_finite() {
        warn!(value, "ignoring non-finite request timeout");
        return DEFAULT_REQUEST_TIMEOUT_S;
    }
    value.clamp(5.0, 600.0)
}

fn env_number<T: FromStr + Copy>(key: &str, default: T) -> T {
    let Some(raw) = non_empty_env(key) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = raw.as_str(), "ignoring unparsable setting");
            default
        }
    }
}
