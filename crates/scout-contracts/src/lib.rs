pub mod candidates;
pub mod commands;
pub mod events;
pub mod filters;
pub mod jobs;
pub mod prompts;
pub mod storage;
