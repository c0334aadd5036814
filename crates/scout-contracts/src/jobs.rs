use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filters::FlatFilters;

/// Job description plus the flat filters extracted alongside it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_description: String,
    #[serde(default)]
    pub filters: FlatFilters,
}

#[derive(Debug)]
pub enum ReplyParseError {
    Empty,
    InvalidJson(serde_json::Error),
    NotAnObject,
    MissingDescription,
    InvalidFilters(serde_json::Error),
}

impl fmt::Display for ReplyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyParseError::Empty => write!(f, "model reply was empty"),
            ReplyParseError::InvalidJson(err) => write!(f, "model reply is not JSON: {}", err),
            ReplyParseError::NotAnObject => write!(f, "model reply is not a JSON object"),
            ReplyParseError::MissingDescription => {
                write!(f, "model reply has no string `job_description`")
            }
            ReplyParseError::InvalidFilters(err) => {
                write!(f, "model reply has malformed `filters`: {}", err)
            }
        }
    }
}

impl std::error::Error for ReplyParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplyParseError::InvalidJson(err) | ReplyParseError::InvalidFilters(err) => Some(err),
            _ => None,
        }
    }
}

/// Removes a leading ```` ```json ```` fence (any case) and a trailing
/// ```` ``` ```` fence, then trims.
pub fn strip_code_fence(reply: &str) -> &str {
    let mut text = reply.trim_start();
    if text
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("```json"))
    {
        text = text[7..].trim_start();
    }
    let trimmed_end = text.trim_end();
    let text = trimmed_end.strip_suffix("```").unwrap_or(trimmed_end);
    text.trim()
}

/// Parses the generator's reply into a [`JobPosting`].
///
/// A missing or `null` `filters` field reads as no filters.
pub fn parse_model_reply(reply: &str) -> Result<JobPosting, ReplyParseError> {
    let text = strip_code_fence(reply);
    if text.is_empty() {
        return Err(ReplyParseError::Empty);
    }
    let parsed: Value = serde_json::from_str(text).map_err(ReplyParseError::InvalidJson)?;
    let Value::Object(mut object) = parsed else {
        return Err(ReplyParseError::NotAnObject);
    };
    let job_description = match object.remove("job_description") {
        Some(Value::String(text)) => text,
        _ => return Err(ReplyParseError::MissingDescription),
    };
    let filters = FlatFilters::from_value(object.remove("filters").unwrap_or(Value::Null))
        .map_err(ReplyParseError::InvalidFilters)?;
    Ok(JobPosting {
        job_description,
        filters,
    })
}
