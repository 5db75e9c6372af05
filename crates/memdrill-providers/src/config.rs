//! Configuration, credentials, and the default candidate list.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use memdrill_core::model::{
    GenerationParameters, ModelConfig, ProviderFamily, RequestShape, DEFAULT_DURATION_SECS,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Environment variable that overrides the Gemini key.
pub const GEMINI_KEY_VAR: &str = "MEMDRILL_GEMINI_KEY";
/// Environment variable that overrides the OpenAI key.
pub const OPENAI_KEY_VAR: &str = "MEMDRILL_OPENAI_KEY";

const GEMINI_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
    "gemini-1.5-flash-8b",
];
const CHAT_MODELS: [&str; 3] = ["gpt-4o-mini", "gpt-3.5-turbo-0125", "gpt-4.1-mini"];

/// The two API keys memdrill can use.
///
/// Note: Custom Debug impl masks keys to prevent accidental exposure in logs.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Key for Gemini-style endpoints.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Key for chat-completion endpoints.
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| k.as_ref().map(|_| "***");
        f.debug_struct("Credentials")
            .field("gemini_api_key", &mask(&self.gemini_api_key))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .finish()
    }
}

impl Credentials {
    /// Blank keys are treated as missing.
    pub fn new(gemini_api_key: Option<String>, openai_api_key: Option<String>) -> Self {
        Self {
            gemini_api_key: non_blank(gemini_api_key),
            openai_api_key: non_blank(openai_api_key),
        }
    }

    pub fn primary(&self) -> Option<&str> {
        self.gemini_api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn secondary(&self) -> Option<&str> {
        self.openai_api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// The key used by a provider family.
    pub fn for_family(&self, family: ProviderFamily) -> Option<&str> {
        match family {
            ProviderFamily::Primary => self.primary(),
            ProviderFamily::Secondary => self.secondary(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary().is_none() && self.secondary().is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Top-level memdrill configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemdrillConfig {
    #[serde(default)]
    pub credentials: Credentials,
    /// Base URL for the default Gemini candidates.
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    /// Base URL for the default chat-completion candidates.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Study time per passage in seconds.
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    /// Candidate models in priority order. Empty means the built-in list.
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}
fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    60
}
fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

impl Default for MemdrillConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            gemini_base_url: default_gemini_base_url(),
            openai_base_url: default_openai_base_url(),
            timeout_secs: default_timeout(),
            duration_secs: default_duration(),
            models: Vec::new(),
        }
    }
}

impl MemdrillConfig {
    /// Candidate models in the order they are tried.
    pub fn candidates(&self) -> Vec<ModelConfig> {
        if self.models.is_empty() {
            default_candidates(&self.gemini_base_url, &self.openai_base_url)
        } else {
            self.models.clone()
        }
    }
}

/// The built-in fallback order: four Gemini models, then three chat models.
pub fn default_candidates(gemini_base_url: &str, openai_base_url: &str) -> Vec<ModelConfig> {
    let gemini_base = gemini_base_url.trim_end_matches('/');
    let openai_base = openai_base_url.trim_end_matches('/');

    let gemini = GEMINI_MODELS.iter().map(|name| ModelConfig {
        name: name.to_string(),
        endpoint: format!("{gemini_base}/v1beta/models/{name}:generateContent"),
        request_shape: RequestShape::Gemini,
        generation: GenerationParameters {
            temperature: 0.3,
            top_k: Some(40),
            top_p: Some(0.95),
            max_output_tokens: 2048,
        },
    });
    let chat = CHAT_MODELS.iter().map(|name| ModelConfig {
        name: name.to_string(),
        endpoint: format!("{openai_base}/v1/chat/completions"),
        request_shape: RequestShape::ChatCompletion,
        generation: GenerationParameters {
            temperature: 0.3,
            top_k: None,
            top_p: None,
            max_output_tokens: 2048,
        },
    });
    gemini.chain(chat).collect()
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    resolve_with(s, |var| std::env::var(var).ok())
}

fn resolve_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&lookup(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_config(config: &mut MemdrillConfig) {
    let resolve_key = |key: &Option<String>| non_blank(key.as_deref().map(resolve_env_vars));
    config.credentials = Credentials {
        gemini_api_key: resolve_key(&config.credentials.gemini_api_key),
        openai_api_key: resolve_key(&config.credentials.openai_api_key),
    };
    config.gemini_base_url = resolve_env_vars(&config.gemini_base_url);
    config.openai_base_url = resolve_env_vars(&config.openai_base_url);
    for model in &mut config.models {
        model.endpoint = resolve_env_vars(&model.endpoint);
    }
}

/// Let explicitly exported keys win over file values.
fn apply_env_overrides(config: &mut MemdrillConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = non_blank(lookup(GEMINI_KEY_VAR)) {
        config.credentials.gemini_api_key = Some(key);
    }
    if let Some(key) = non_blank(lookup(OPENAI_KEY_VAR)) {
        config.credentials.openai_api_key = Some(key);
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `memdrill.toml` in the current directory
/// 2. `~/.config/memdrill/config.toml`
///
/// Environment variable overrides: `MEMDRILL_GEMINI_KEY`, `MEMDRILL_OPENAI_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<MemdrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("memdrill.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loading config");
            toml::from_str::<MemdrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MemdrillConfig::default(),
    };

    resolve_config(&mut config);
    apply_env_overrides(&mut config, |var| std::env::var(var).ok());

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("memdrill"))
}
