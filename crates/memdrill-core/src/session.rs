//! Session records handed to the document store after a drill step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Difficulty, ExerciseType, LanguageHint};
use crate::traits::{AuthContext, SessionStore};

/// Step id of the timed memorization step.
pub const MEMORIZATION_STEP_ID: u32 = 1;
/// Name stored for the timed memorization step.
pub const MEMORIZATION_STEP_NAME: &str = "타이머 학습";
/// Score awarded for finishing the memorization step.
pub const MEMORIZATION_SCORE: u32 = 100;

/// One trainee session as stored in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub exercise_type: ExerciseType,
    pub total_score: u32,
    /// Number of drill steps completed in this session.
    pub step_count: u32,
    /// Seconds spent studying.
    pub study_time: u32,
    pub average_score: f64,
    /// Language label ("한국어", "중국어").
    pub language: String,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    pub metadata: SessionMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step_id: u32,
    pub step_name: String,
    pub score: u32,
    pub time_used: u32,
    pub completed: bool,
    #[serde(default)]
    pub details: Option<StepDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDetails {
    pub script: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub difficulty: Difficulty,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    pub ai_generated: bool,
}

/// What the memorization step learned, used to build its session record.
#[derive(Debug, Clone)]
pub struct MemorizationSummary<'a> {
    pub exercise_type: ExerciseType,
    pub language: LanguageHint,
    pub difficulty: Difficulty,
    pub custom_prompt: Option<&'a str>,
    pub script: &'a str,
    pub key_points: &'a [String],
    pub study_time_secs: u32,
}

impl SessionRecord {
    /// Record for a session in which only the memorization step was finished.
    pub fn memorization(summary: &MemorizationSummary<'_>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            exercise_type: summary.exercise_type,
            total_score: MEMORIZATION_SCORE,
            step_count: 1,
            study_time: summary.study_time_secs,
            average_score: f64::from(MEMORIZATION_SCORE),
            language: summary.language.label().to_string(),
            steps: vec![StepRecord {
                step_id: MEMORIZATION_STEP_ID,
                step_name: MEMORIZATION_STEP_NAME.to_string(),
                score: MEMORIZATION_SCORE,
                time_used: summary.study_time_secs,
                completed: true,
                details: Some(StepDetails {
                    script: summary.script.to_string(),
                    key_points: summary.key_points.to_vec(),
                }),
            }],
            metadata: SessionMetadata {
                difficulty: summary.difficulty,
                custom_prompt: summary.custom_prompt.map(str::to_string),
                ai_generated: true,
            },
        }
    }
}

/// Save `record` when someone is signed in.
///
/// Returns the stored document id. A missing user skips the save silently;
/// a store failure is logged and swallowed so the drill can move on.
pub async fn save_if_signed_in(
    auth: &dyn AuthContext,
    store: &dyn SessionStore,
    record: &SessionRecord,
) -> Option<String> {
    let user = auth.current_user()?;
    match store.save_session(&user, record).await {
        Ok(id) => {
            tracing::info!(session = %record.id, document = %id, "saved drill session");
            Some(id)
        }
        Err(e) => {
            tracing::error!(session = %record.id, "failed to save drill session: {e:#}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::SessionRecord;
    use crate::traits::{SessionStore, UserContext};

    /// Store that keeps records in memory, or fails every save.
    #[derive(Default)]
    pub struct MemoryStore {
        pub saved: Mutex<Vec<(String, SessionRecord)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl SessionStore for MemoryStore {
        async fn save_session(
            &self,
            user: &UserContext,
            record: &SessionRecord,
        ) -> anyhow::Result<String> {
            if self.fail {
                anyhow::bail!("document store unreachable");
            }
            let mut saved = self.saved.lock().unwrap();
            saved.push((user.uid.clone(), record.clone()));
            Ok(format!("doc-{}", saved.len()))
        }
    }

    pub fn trainee() -> UserContext {
        UserContext {
            uid: "user-1".into(),
            display_name: Some("Trainee".into()),
            email: None,
        }
    }
}
