//! Local session history as a JSON-lines file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use memdrill_core::session::SessionRecord;
use memdrill_core::traits::{SessionStore, UserContext};

/// Appends one JSON object per finished session.
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SessionStore for HistoryFile {
    async fn save_session(&self, user: &UserContext, record: &SessionRecord) -> Result<String> {
        let mut line = serde_json::to_value(record)?;
        line["uid"] = serde_json::Value::String(user.uid.clone());
        let mut line = serde_json::to_string(&line)?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open history file: {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to write history file: {}", self.path.display()))?;

        Ok(record.id.to_string())
    }
}

/// The person running the CLI, named after the login user.
pub fn local_user() -> UserContext {
    let uid = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string());
    UserContext {
        uid,
        display_name: None,
        email: None,
    }
}
