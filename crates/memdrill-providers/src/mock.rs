//! Scripted generator for testing without real API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use memdrill_core::error::GenerationError;
use memdrill_core::model::{GenerationRequest, GenerationResult};
use memdrill_core::traits::TextGenerator;

/// A generator that replays queued outcomes in order.
///
/// Once the queue is empty every call returns the fallback passage.
pub struct ScriptedGenerator {
    /// Outcomes returned by the next calls, front first.
    script: Mutex<VecDeque<Result<GenerationResult, GenerationError>>>,
    /// Passage returned once the script runs out.
    fallback: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(script: impl IntoIterator<Item = Result<GenerationResult, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: "First, the delegation reviewed the market study.".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A generator that always returns the same passage.
    pub fn with_fixed_text(text: &str) -> Self {
        Self {
            fallback: text.to_string(),
            ..Self::new(Vec::new())
        }
    }

    /// Convenience for a successful outcome attributed to `model`.
    pub fn passage(model: &str, text: &str) -> Result<GenerationResult, GenerationError> {
        Ok(GenerationResult {
            raw_text: text.to_string(),
            source_model_name: model.to_string(),
            was_truncated: false,
        })
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Self::passage("scripted", &self.fallback))
    }
}
