//! Sequential fallback across the candidate models.
//!
//! Candidates are tried strictly in list order, one request each. A
//! capacity failure moves on to the next candidate; anything else stops the
//! loop. There is no backoff and no retry of the same model.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use memdrill_core::error::{indicates_overload, GenerationError, OVERLOADED_MESSAGE};
use memdrill_core::model::{GenerationRequest, GenerationResult, ModelConfig, RequestShape};
use memdrill_core::traits::TextGenerator;

use crate::config::{Credentials, MemdrillConfig};
use crate::{gemini, openai};

/// Longest candidate list the invoker will walk.
pub const MAX_CANDIDATES: usize = 7;

/// Tries each configured model until one produces a passage.
pub struct ProviderFallbackInvoker {
    client: reqwest::Client,
    candidates: Vec<ModelConfig>,
    credentials: Credentials,
}

impl ProviderFallbackInvoker {
    pub fn new(
        mut candidates: Vec<ModelConfig>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        if candidates.len() > MAX_CANDIDATES {
            tracing::warn!(
                configured = candidates.len(),
                kept = MAX_CANDIDATES,
                "too many candidate models, ignoring the rest"
            );
            candidates.truncate(MAX_CANDIDATES);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            candidates,
            credentials,
        })
    }

    pub fn from_config(config: &MemdrillConfig) -> Result<Self, GenerationError> {
        Self::new(
            config.candidates(),
            config.credentials.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Candidates in the order they are tried.
    pub fn candidates(&self) -> &[ModelConfig] {
        &self.candidates
    }

    /// Generate a passage with explicit credentials.
    ///
    /// Candidates whose family has no credential are skipped without
    /// counting as a failure. When every attempted candidate reported a
    /// capacity problem, the last message is returned, rewritten to a
    /// friendly notice if it was an overload.
    #[instrument(skip_all, fields(candidates = self.candidates.len()))]
    pub async fn invoke(
        &self,
        request: &GenerationRequest,
        credentials: &Credentials,
    ) -> Result<GenerationResult, GenerationError> {
        if request.prompt_text.trim().is_empty() {
            return Err(GenerationError::InvalidRequest("prompt is empty".into()));
        }
        if credentials.is_empty() {
            return Err(GenerationError::Configuration(
                "no credential configured".into(),
            ));
        }

        let mut last_failure: Option<String> = None;
        let mut attempts = 0usize;

        for model in &self.candidates {
            let Some(key) = credentials.for_family(model.family()) else {
                tracing::debug!(
                    model = %model.name,
                    family = %model.family(),
                    "no credential for candidate, skipping"
                );
                continue;
            };
            attempts += 1;

            let outcome = match model.request_shape {
                RequestShape::Gemini => {
                    gemini::generate(&self.client, model, key, &request.prompt_text).await
                }
                RequestShape::ChatCompletion => {
                    openai::generate(&self.client, model, key, &request.prompt_text).await
                }
            };

            match outcome {
                Ok(result) => {
                    tracing::info!(
                        model = %result.source_model_name,
                        attempts,
                        truncated = result.was_truncated,
                        "passage generated"
                    );
                    return Ok(result);
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(model = %model.name, error = %e, "candidate unavailable, trying next");
                    last_failure = Some(e.message().to_string());
                }
                Err(e) => {
                    tracing::error!(model = %model.name, error = %e, "candidate failed, giving up");
                    return Err(e);
                }
            }
        }

        let Some(message) = last_failure else {
            return Err(GenerationError::Configuration(
                "no candidate model matches the configured credentials".into(),
            ));
        };
        let message = if indicates_overload(&message) {
            OVERLOADED_MESSAGE.to_string()
        } else {
            message
        };
        Err(GenerationError::AllProvidersFailed { message })
    }
}

#[async_trait]
impl TextGenerator for ProviderFallbackInvoker {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        self.invoke(request, &self.credentials).await
    }
}
