//! Classification of backend failures.
//!
//! Every non-2xx response becomes either a retryable failure (move on to the
//! next candidate) or a terminal one (stop the fallback loop).

use memdrill_core::error::GenerationError;
use serde::Deserialize;

/// Substrings that mark a capacity or availability problem.
const CAPACITY_TOKENS: [&str; 5] = ["quota", "limit", "rate", "overloaded", "unavailable"];

/// Substrings that mark a credential problem, which no fallback can fix.
const AUTH_TOKENS: [&str; 2] = ["authentication", "Unauthorized"];

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Whether a failed response should fall through to the next candidate.
///
/// Matching is case-sensitive on purpose: a bare "Unauthorized" reason phrase
/// counts as an auth failure, "unauthorized" inside a quota message does not.
pub fn is_capacity_failure(status: u16, message: &str) -> bool {
    let capacity =
        matches!(status, 429 | 503) || CAPACITY_TOKENS.iter().any(|t| message.contains(t));
    let auth = status == 401 || AUTH_TOKENS.iter().any(|t| message.contains(t));
    capacity && !auth
}

/// Turn a failed response into the matching `GenerationError`.
pub fn classify(model: &str, status: u16, message: String) -> GenerationError {
    if is_capacity_failure(status, &message) {
        GenerationError::Retryable {
            model: model.to_string(),
            status,
            message,
        }
    } else {
        GenerationError::Terminal {
            model: model.to_string(),
            status: Some(status),
            message,
        }
    }
}

/// `error.message` from a JSON error body, else the HTTP reason phrase.
pub fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Read and classify a non-2xx response.
pub(crate) async fn failure_from_response(
    model: &str,
    response: reqwest::Response,
) -> GenerationError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify(model, status.as_u16(), error_message(status, &body))
}

/// Connection errors and timeouts end the loop.
pub(crate) fn transport_failure(model: &str, err: reqwest::Error) -> GenerationError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    GenerationError::Terminal {
        model: model.to_string(),
        status: None,
        message,
    }
}

pub(crate) fn shape_error(model: &str, message: impl Into<String>) -> GenerationError {
    GenerationError::ResponseShape {
        model: model.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn capacity_statuses_are_retryable() {
        assert!(is_capacity_failure(429, "Too Many Requests"));
        assert!(is_capacity_failure(503, "The model is overloaded."));
    }

    #[test]
    fn capacity_wording_is_retryable_on_any_status() {
        assert!(is_capacity_failure(400, "Resource has been exhausted (e.g. check quota)."));
        assert!(is_capacity_failure(500, "backend temporarily unavailable"));
    }

    #[test]
    fn auth_always_wins() {
        assert!(!is_capacity_failure(401, "quota exceeded"));
        assert!(!is_capacity_failure(429, "authentication required"));
        assert!(!is_capacity_failure(503, "Unauthorized"));
    }

    #[test]
    fn plain_client_errors_are_terminal() {
        assert!(!is_capacity_failure(400, "API key not valid. Please pass a valid API key."));
        let err = classify("gemini-2.5-flash", 404, "model not found".into());
        assert!(matches!(
            err,
            GenerationError::Terminal { status: Some(404), .. }
        ));
    }

    #[test]
    fn message_from_json_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            error_message(StatusCode::TOO_MANY_REQUESTS, body),
            "Quota exceeded"
        );
    }

    #[test]
    fn message_falls_back_to_reason_phrase() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>oops</html>"),
            "Service Unavailable"
        );
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, r#"{"error":{}}"#),
            "Unauthorized"
        );
    }
}
