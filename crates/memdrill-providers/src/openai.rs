//! OpenAI-compatible chat-completions backend.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use memdrill_core::error::GenerationError;
use memdrill_core::model::{GenerationResult, ModelConfig};

use crate::error::{failure_from_response, shape_error, transport_failure};
use crate::gemini::{self, GeminiCandidate, GeminiContent, GeminiPart, GeminiResponse};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[instrument(skip(client, key, prompt), fields(model = %model.name))]
pub(crate) async fn generate(
    client: &reqwest::Client,
    model: &ModelConfig,
    key: &str,
    prompt: &str,
) -> Result<GenerationResult, GenerationError> {
    let body = ChatRequest {
        model: &model.name,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        temperature: model.generation.temperature,
        max_tokens: model.generation.max_output_tokens,
    };

    let response = client
        .post(&model.endpoint)
        .header("Authorization", format!("Bearer {key}"))
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| transport_failure(&model.name, e))?;

    if !response.status().is_success() {
        return Err(failure_from_response(&model.name, response).await);
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|e| shape_error(&model.name, format!("failed to parse response: {e}")))?;
    gemini::normalize(&model.name, repackage(&model.name, parsed)?)
}

/// Rewrite a chat response into the `generateContent` shape.
fn repackage(model: &str, response: ChatResponse) -> Result<GeminiResponse, GenerationError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| shape_error(model, "response has no choices"))?;
    let text = choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| shape_error(model, "choice has no message content"))?;
    let finish_reason = choice.finish_reason.map(|reason| match reason.as_str() {
        "length" => gemini::MAX_TOKENS.to_string(),
        _ => reason.to_uppercase(),
    });

    Ok(GeminiResponse {
        candidates: vec![GeminiCandidate {
            content: Some(GeminiContent {
                parts: vec![GeminiPart { text: Some(text) }],
            }),
            finish_reason,
        }],
    })
}
