//! Error types for chatpulse-core

use std::time::Duration;
use thiserror::Error;

/// Main error type for the chatpulse-core library
///
/// Analytics operations never fail; these variants cover the edges of the
/// crate (configuration, knowledge-base files, event logs, completions).
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Knowledge base could not be loaded or is malformed
    #[error("knowledge base error: {0}")]
    KnowledgeBase(String),

    /// Parse error in a chat event log
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// External completion provider failed
    #[error("completion error: {0}")]
    Completion(String),

    /// External completion provider did not answer in time
    #[error("completion timed out after {0:?}")]
    CompletionTimeout(Duration),
}

/// Result type alias for chatpulse-core
pub type Result<T> = std::result::Result<T, Error>;
