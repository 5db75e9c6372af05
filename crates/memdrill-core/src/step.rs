//! The timed memorization step.
//!
//! `MemorizationStep` owns everything the first drill step needs: the
//! trainee's selection, the generated passage, the last error, and the
//! countdown. All transitions go through its methods; nothing else holds
//! the timer's ticking task.
//!
//! Dropping the future returned by [`MemorizationStep::generate`] cancels
//! the in-flight backend request along with it.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::GenerationError;
use crate::keywords::{self, KeywordSet};
use crate::model::{
    Difficulty, ExerciseContent, ExerciseType, GenerationRequest, LanguageHint,
    DEFAULT_DURATION_SECS,
};
use crate::session::{save_if_signed_in, MemorizationSummary, SessionRecord};
use crate::timer::{Countdown, StudyTimer, TimerEvent};
use crate::traits::{AuthContext, SessionStore, TextGenerator};

/// Category tag handed to later steps.
pub const MEMORY_CATEGORY: &str = "memory";

/// What the memorization step passes on to the recall steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepHandoff {
    pub script: String,
    pub key_points: KeywordSet,
    pub title: String,
    pub duration_secs: u32,
    pub category: String,
    pub exercise_type: ExerciseType,
}

pub struct MemorizationStep {
    exercise_type: Option<ExerciseType>,
    language: LanguageHint,
    custom_prompt: String,
    duration_secs: u32,
    content: Option<ExerciseContent>,
    error: Option<String>,
    used_model: Option<String>,
    countdown: Countdown,
}

impl Default for MemorizationStep {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl MemorizationStep {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            exercise_type: None,
            language: LanguageHint::Korean,
            custom_prompt: String::new(),
            duration_secs,
            content: None,
            error: None,
            used_model: None,
            countdown: Countdown::new(StudyTimer::new(duration_secs)),
        }
    }

    pub fn select(
        &mut self,
        exercise_type: ExerciseType,
        language: LanguageHint,
        custom_prompt: impl Into<String>,
    ) {
        self.exercise_type = Some(exercise_type);
        self.language = language;
        self.custom_prompt = custom_prompt.into();
    }

    pub fn content(&self) -> Option<&ExerciseContent> {
        self.content.as_ref()
    }

    /// The last generation failure, as shown to the trainee.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Model that produced the current passage.
    pub fn used_model(&self) -> Option<&str> {
        self.used_model.as_deref()
    }

    pub fn timer(&self) -> &StudyTimer {
        self.countdown.timer()
    }

    /// Fetch a new passage and arm the timer for it.
    ///
    /// On failure the previous passage (if any) is kept and the error text
    /// is stored for display.
    #[instrument(skip_all, fields(generator = generator.name()))]
    pub async fn generate(
        &mut self,
        generator: &dyn TextGenerator,
    ) -> Result<&ExerciseContent, GenerationError> {
        let Some(exercise_type) = self.exercise_type else {
            return Err(GenerationError::InvalidRequest(
                "select an exercise type first".into(),
            ));
        };
        self.error = None;

        let request = GenerationRequest::for_exercise(
            exercise_type,
            self.language,
            Some(self.custom_prompt.as_str()),
        );

        let result = match generator.generate(&request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("generation failed: {e}");
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        let script = result.raw_text.trim().to_string();
        let key_points = keywords::extract(&script);
        tracing::info!(
            model = %result.source_model_name,
            truncated = result.was_truncated,
            keywords = key_points.len(),
            "passage ready"
        );

        self.used_model = Some(result.source_model_name);
        self.countdown = Countdown::new(StudyTimer::new(self.duration_secs));
        Ok(self.content.insert(ExerciseContent {
            script,
            key_points,
            duration_secs: self.duration_secs,
            exercise_type,
            difficulty: Difficulty::Medium,
        }))
    }

    pub fn start_timer(&mut self) -> Option<TimerEvent> {
        self.content.as_ref()?;
        self.countdown.start()
    }

    pub fn pause_timer(&mut self) -> Option<TimerEvent> {
        self.countdown.pause()
    }

    pub fn resume_timer(&mut self) -> Option<TimerEvent> {
        self.countdown.resume()
    }

    /// Wait for the next second of study time.
    pub async fn next_tick(&mut self) -> Option<TimerEvent> {
        self.countdown.next_tick().await
    }

    /// Finish the step and hand the passage to the recall steps.
    ///
    /// The session is saved when someone is signed in; a failed save does not
    /// stop the hand-off.
    pub async fn complete(
        &mut self,
        auth: &dyn AuthContext,
        store: &dyn SessionStore,
    ) -> Option<StepHandoff> {
        let content = self.content.as_ref()?;
        self.countdown.complete();

        let key_points = keywords::extract(&content.script);
        let record = SessionRecord::memorization(&MemorizationSummary {
            exercise_type: content.exercise_type,
            language: self.language,
            difficulty: content.difficulty,
            custom_prompt: Some(self.custom_prompt.as_str()).filter(|p| !p.is_empty()),
            script: &content.script,
            key_points: key_points.as_slice(),
            study_time_secs: self.countdown.timer().elapsed(),
        });
        save_if_signed_in(auth, store, &record).await;

        Some(StepHandoff {
            script: content.script.clone(),
            key_points,
            title: format!("{} 훈련", content.exercise_type.label()),
            duration_secs: content.duration_secs,
            category: MEMORY_CATEGORY.to_string(),
            exercise_type: content.exercise_type,
        })
    }

    /// Go back to a blank step, stopping the timer.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::model::GenerationResult;
    use crate::session::testing::{trainee, MemoryStore};
    use crate::timer::TimerPhase;
    use crate::traits::Anonymous;

    struct FixedGenerator(Result<&'static str, GenerationError>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult, GenerationError> {
            self.0.clone().map(|text| GenerationResult {
                raw_text: text.to_string(),
                source_model_name: "gemini-2.5-flash".into(),
                was_truncated: false,
            })
        }
    }

    fn ready_step() -> MemorizationStep {
        let mut step = MemorizationStep::new(3);
        step.select(ExerciseType::ListsAndOrder, LanguageHint::Korean, "");
        step
    }

    #[tokio::test]
    async fn generate_requires_a_selection() {
        let mut step = MemorizationStep::default();
        let err = step
            .generate(&FixedGenerator(Ok("먼저 시장을 분석했다.")))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
        assert!(step.content().is_none());
    }

    #[tokio::test]
    async fn generate_stores_content_and_keywords() {
        let mut step = ready_step();
        let content = step
            .generate(&FixedGenerator(Ok("  먼저 시장을 분석했다.\n")))
            .await
            .unwrap();
        assert_eq!(content.script, "먼저 시장을 분석했다.");
        assert_eq!(content.key_points.as_slice()[0], "먼저");
        assert_eq!(content.duration_secs, 3);
        assert_eq!(step.used_model(), Some("gemini-2.5-flash"));
        assert_eq!(step.timer().phase(), TimerPhase::Idle);
    }

    #[tokio::test]
    async fn generate_failure_is_kept_for_display() {
        let mut step = ready_step();
        let result = step
            .generate(&FixedGenerator(Err(GenerationError::AllProvidersFailed {
                message: "AI service is overloaded right now, please retry later.".into(),
            })))
            .await;
        assert!(result.is_err());
        assert_eq!(
            step.error(),
            Some("AI service is overloaded right now, please retry later.")
        );
        step.dismiss_error();
        assert!(step.error().is_none());
    }

    #[tokio::test]
    async fn timer_needs_content() {
        let mut step = ready_step();
        assert_eq!(step.start_timer(), None);
        step.generate(&FixedGenerator(Ok("먼저 시장을 분석했다.")))
            .await
            .unwrap();
        assert_eq!(step.start_timer(), Some(TimerEvent::Started));
    }

    #[tokio::test(start_paused = true)]
    async fn complete_hands_off_and_saves() {
        let mut step = ready_step();
        step.generate(&FixedGenerator(Ok("먼저 시장을 분석했다.")))
            .await
            .unwrap();
        step.start_timer();
        step.next_tick().await;

        let store = MemoryStore::default();
        let handoff = step.complete(&Some(trainee()), &store).await.unwrap();
        assert_eq!(handoff.title, "목록/순서 훈련");
        assert_eq!(handoff.category, "memory");
        assert_eq!(handoff.key_points.as_slice()[0], "먼저");
        assert!(step.timer().is_completed());

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].1.study_time, 1);
        assert_eq!(saved[0].1.metadata.custom_prompt, None);
    }

    #[tokio::test]
    async fn anonymous_completion_skips_the_store() {
        let mut step = ready_step();
        step.generate(&FixedGenerator(Ok("먼저 시장을 분석했다.")))
            .await
            .unwrap();
        let store = MemoryStore::default();
        assert!(step.complete(&Anonymous, &store).await.is_some());
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let mut step = ready_step();
        step.generate(&FixedGenerator(Ok("먼저 시장을 분석했다.")))
            .await
            .unwrap();
        step.start_timer();
        step.reset();
        assert!(step.content().is_none());
        assert!(step.used_model().is_none());
        assert_eq!(step.timer().phase(), TimerPhase::Idle);
        assert_eq!(step.timer().duration(), 3);
    }
}
