use std::fmt;
use std::sync::Arc;

use scout_contracts::events::{payload, EventWriter};
use scout_contracts::jobs::{parse_model_reply, JobPosting, ReplyParseError};
use scout_contracts::prompts::build_job_prompt;
use scout_contracts::storage::{Storage, FILTERS_KEY, JOB_DESCRIPTION_KEY, PROMPT_KEY};
use serde_json::json;
use tracing::{info, warn};

use crate::{emit_or_warn, TextModel, TextRequest};

#[derive(Debug)]
pub enum GenerateError {
    MissingPrompt,
    /// The model call itself failed (network, auth, quota).
    Model(anyhow::Error),
    /// The model answered, but not with the expected JSON.
    Reply(ReplyParseError),
    Storage(anyhow::Error),
}

impl GenerateError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateError::MissingPrompt => "missing_prompt",
            GenerateError::Model(_) => "model",
            GenerateError::Reply(_) => "reply",
            GenerateError::Storage(_) => "storage",
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::MissingPrompt => {
                write!(f, "no hiring prompt stored under '{}'", PROMPT_KEY)
            }
            GenerateError::Model(err) => write!(f, "Error generating job description: {:#}", err),
            GenerateError::Reply(err) => write!(f, "Could not parse model response: {}", err),
            GenerateError::Storage(err) => write!(f, "storage access failed: {:#}", err),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::MissingPrompt => None,
            GenerateError::Model(err) | GenerateError::Storage(err) => Some(&**err),
            GenerateError::Reply(err) => Some(err),
        }
    }
}

/// Generator stage: prompt in storage -> model -> job posting, publishing
/// the extracted filters back to storage on success only.
pub struct JobGenerator<S: Storage> {
    storage: S,
    model: Arc<dyn TextModel>,
    model_name: String,
    max_output_tokens: u32,
    events: EventWriter,
}

impl<S: Storage> JobGenerator<S> {
    pub fn new(
        storage: S,
        model: Arc<dyn TextModel>,
        model_name: impl Into<String>,
        max_output_tokens: u32,
        events: EventWriter,
    ) -> Self {
        Self {
            storage,
            model,
            model_name: model_name.into(),
            max_output_tokens,
            events,
        }
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Runs one generation. `edit_instruction` is appended to the stored
    /// prompt when present.
    pub fn generate(&mut self, edit_instruction: Option<&str>) -> Result<JobPosting, GenerateError> {
        emit_or_warn(
            &self.events,
            "job_generation_started",
            payload(json!({
                "model": self.model_name,
                "provider": self.model.name(),
                "edited": edit_instruction.is_some_and(|edit| !edit.trim().is_empty()),
            })),
        );
        let result = self.run(edit_instruction);
        match &result {
            Ok(posting) => {
                info!(
                    filters = posting.filters.len(),
                    "job description generated"
                );
                emit_or_warn(
                    &self.events,
                    "job_generated",
                    payload(json!({
                        "model": self.model_name,
                        "filters": posting.filters.len(),
                        "description_chars": posting.job_description.chars().count(),
                    })),
                );
            }
            Err(err) => {
                warn!(kind = err.kind(), "job generation failed: {err}");
                emit_or_warn(
                    &self.events,
                    "job_generation_failed",
                    payload(json!({
                        "model": self.model_name,
                        "kind": err.kind(),
                        "error": err.to_string(),
                    })),
                );
            }
        }
        result
    }

    fn run(&mut self, edit_instruction: Option<&str>) -> Result<JobPosting, GenerateError> {
        let user_prompt = self
            .storage
            .get(PROMPT_KEY)
            .map_err(GenerateError::Storage)?
            .filter(|prompt| !prompt.trim().is_empty())
            .ok_or(GenerateError::MissingPrompt)?;

        let request = TextRequest {
            model: self.model_name.clone(),
            prompt: build_job_prompt(&user_prompt, edit_instruction),
            max_output_tokens: self.max_output_tokens,
        };
        let reply = self
            .model
            .generate(&request)
            .map_err(GenerateError::Model)?;
        let posting = parse_model_reply(&reply).map_err(GenerateError::Reply)?;

        let filters_json = serde_json::to_string(&posting.filters)
            .map_err(|err| GenerateError::Storage(err.into()))?;
        // `filters` goes last: it is what the search stage adopts.
        self.storage
            .set(JOB_DESCRIPTION_KEY, &posting.job_description)
            .map_err(GenerateError::Storage)?;
        self.storage
            .set(FILTERS_KEY, &filters_json)
            .map_err(GenerateError::Storage)?;
        Ok(posting)
    }
}
