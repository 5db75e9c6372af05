//! Generation error types.
//!
//! These error types represent failures while obtaining a passage from the
//! model backends. Defined in `memdrill-core` so the step controller can
//! decide what to show the trainee without string matching.

use thiserror::Error;

/// Message shown when the last failure was a server overload.
pub const OVERLOADED_MESSAGE: &str = "AI service is overloaded right now, please retry later.";

/// Errors that can occur while generating a passage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The request itself is unusable (e.g. an empty prompt).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No usable credential; nothing was sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A backend signalled a capacity or availability problem.
    #[error("{model} is unavailable (HTTP {status}): {message}")]
    Retryable {
        model: String,
        status: u16,
        message: String,
    },

    /// A backend rejected the request (auth, validation, transport).
    #[error("{model} failed{}: {message}", http_suffix(.status))]
    Terminal {
        model: String,
        status: Option<u16>,
        message: String,
    },

    /// Every candidate was skipped or failed with a retryable error.
    #[error("all providers failed: {message}")]
    AllProvidersFailed { message: String },

    /// A 2xx response that does not match the expected schema.
    #[error("unexpected response from {model}: {message}")]
    ResponseShape { model: String, message: String },
}

impl GenerationError {
    /// Returns `true` if the fallback loop should move on to the next candidate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Retryable { .. })
    }

    /// The raw provider message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            GenerationError::InvalidRequest(m) | GenerationError::Configuration(m) => m,
            GenerationError::Retryable { message, .. }
            | GenerationError::Terminal { message, .. }
            | GenerationError::AllProvidersFailed { message }
            | GenerationError::ResponseShape { message, .. } => message,
        }
    }

    /// Text suitable for an inline error next to a retry button.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::AllProvidersFailed { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Returns `true` when a provider message reads as a server overload.
///
/// Case-insensitive, so a bare "Service Unavailable" reason phrase counts.
pub fn indicates_overload(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("overloaded") || message.contains("unavailable")
}
