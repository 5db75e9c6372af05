//! Gemini `generateContent` wire format.
//!
//! This is also the canonical response shape: chat-completion responses are
//! repackaged into [`GeminiResponse`] so one normalization path handles both.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use memdrill_core::error::GenerationError;
use memdrill_core::model::{GenerationResult, ModelConfig};

use crate::error::{failure_from_response, shape_error, transport_failure};

/// Finish reason reported when the token budget ran out mid-answer.
pub(crate) const MAX_TOKENS: &str = "MAX_TOKENS";

/// Partial answers at or under this many characters are not worth cutting.
const MIN_PARTIAL_CHARS: usize = 50;
/// A cut answer must keep more than this many characters.
const MIN_TRIMMED_CHARS: usize = 30;

const SENTENCE_TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiPart {
    pub text: Option<String>,
}

/// Send one `generateContent` request. The key travels as `?key=`.
#[instrument(skip(client, key, prompt), fields(model = %model.name))]
pub(crate) async fn generate(
    client: &reqwest::Client,
    model: &ModelConfig,
    key: &str,
    prompt: &str,
) -> Result<GenerationResult, GenerationError> {
    let url = reqwest::Url::parse_with_params(&model.endpoint, &[("key", key)]).map_err(|e| {
        GenerationError::Configuration(format!("invalid endpoint for {}: {e}", model.name))
    })?;

    let body = GeminiRequest {
        contents: [RequestContent {
            parts: [RequestPart { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: model.generation.temperature,
            top_k: model.generation.top_k,
            top_p: model.generation.top_p,
            max_output_tokens: model.generation.max_output_tokens,
        },
    };

    let response = client
        .post(url)
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| transport_failure(&model.name, e))?;

    if !response.status().is_success() {
        return Err(failure_from_response(&model.name, response).await);
    }

    let parsed: GeminiResponse = response
        .json()
        .await
        .map_err(|e| shape_error(&model.name, format!("failed to parse response: {e}")))?;
    normalize(&model.name, parsed)
}

/// Pull the passage out of a successful response.
///
/// A `MAX_TOKENS` answer is cut back to its last complete sentence; if that
/// leaves too little text the response is rejected.
pub(crate) fn normalize(
    model: &str,
    response: GeminiResponse,
) -> Result<GenerationResult, GenerationError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| shape_error(model, "response has no candidates"))?;
    let truncated = candidate.finish_reason.as_deref() == Some(MAX_TOKENS);

    let text = candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            shape_error(
                model,
                format!(
                    "candidate has no text (finishReason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("none")
                ),
            )
        })?;

    if !truncated {
        return Ok(GenerationResult {
            raw_text: text,
            source_model_name: model.to_string(),
            was_truncated: false,
        });
    }

    let partial = text.trim();
    let cut = Some(partial)
        .filter(|p| p.chars().count() > MIN_PARTIAL_CHARS)
        .and_then(trim_to_last_sentence)
        .filter(|c| c.chars().count() > MIN_TRIMMED_CHARS)
        .ok_or_else(|| shape_error(model, "answer hit the token limit before a full passage"))?;

    tracing::debug!(model, kept = cut.chars().count(), "trimmed token-limited answer");
    Ok(GenerationResult {
        raw_text: cut.to_string(),
        source_model_name: model.to_string(),
        was_truncated: true,
    })
}

/// Everything up to and including the last sentence terminator.
fn trim_to_last_sentence(text: &str) -> Option<&str> {
    let (idx, terminator) = text
        .char_indices()
        .rev()
        .find(|(_, c)| SENTENCE_TERMINATORS.contains(c))?;
    Some(text[..idx + terminator.len_utf8()].trim())
}
