//! Trait definitions for the collaborators a memorization step talks to.
//!
//! `TextGenerator` is implemented by `memdrill-providers`; the session store
//! and auth context are supplied by whatever hosts the drill.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::model::{GenerationRequest, GenerationResult};
use crate::session::SessionRecord;

// ---------------------------------------------------------------------------
// Text generation
// ---------------------------------------------------------------------------

/// Anything that can turn a prompt into a passage.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable generator name (e.g. "fallback").
    fn name(&self) -> &str;

    /// Generate one passage.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError>;
}

// ---------------------------------------------------------------------------
// Persistence and auth collaborators
// ---------------------------------------------------------------------------

/// The signed-in trainee, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Source of the current user.
pub trait AuthContext: Send + Sync {
    fn current_user(&self) -> Option<UserContext>;
}

/// No one is signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl AuthContext for Anonymous {
    fn current_user(&self) -> Option<UserContext> {
        None
    }
}

impl AuthContext for Option<UserContext> {
    fn current_user(&self) -> Option<UserContext> {
        self.clone()
    }
}

/// Document store that keeps a trainee's session history.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a session record and return the stored document id.
    async fn save_session(
        &self,
        user: &UserContext,
        record: &SessionRecord,
    ) -> anyhow::Result<String>;
}
