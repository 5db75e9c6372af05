//! Core data model types for memdrill.
//!
//! These are the types shared by the generator backends, the keyword
//! distiller, and the memorization step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::keywords::KeywordSet;

/// Default time a trainee gets to memorize a passage, in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Wire shape a model backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestShape {
    /// Content-generation style (`generateContent`, `candidates[]`).
    Gemini,
    /// Chat-completion style (`messages[]`, `choices[]`).
    ChatCompletion,
}

impl RequestShape {
    /// The provider family this shape belongs to, which decides the credential.
    pub fn family(self) -> ProviderFamily {
        match self {
            RequestShape::Gemini => ProviderFamily::Primary,
            RequestShape::ChatCompletion => ProviderFamily::Secondary,
        }
    }
}

/// Which of the two configured credentials a backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    Primary,
    Secondary,
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFamily::Primary => write!(f, "gemini"),
            ProviderFamily::Secondary => write!(f, "openai"),
        }
    }
}

/// Sampling parameters sent with every request to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub temperature: f64,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f64>,
    /// `maxOutputTokens` for Gemini, `max_tokens` for chat completions.
    pub max_output_tokens: u32,
}

/// One candidate backend in the fallback list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub name: String,
    /// Full request URL.
    pub endpoint: String,
    /// Wire shape of the endpoint.
    pub request_shape: RequestShape,
    /// Sampling parameters.
    pub generation: GenerationParameters,
}

impl ModelConfig {
    pub fn family(&self) -> ProviderFamily {
        self.request_shape.family()
    }
}

/// Language of the passage to generate, and the script family detected in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageHint {
    Korean,
    Chinese,
    Other,
}

impl LanguageHint {
    /// Label used in prompts and session records.
    pub fn label(self) -> &'static str {
        match self {
            LanguageHint::Korean => "한국어",
            LanguageHint::Chinese => "중국어",
            LanguageHint::Other => "English",
        }
    }
}

impl fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageHint::Korean => write!(f, "korean"),
            LanguageHint::Chinese => write!(f, "chinese"),
            LanguageHint::Other => write!(f, "other"),
        }
    }
}

impl FromStr for LanguageHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ko" | "korean" | "한국어" => Ok(LanguageHint::Korean),
            "zh" | "chinese" | "중국어" => Ok(LanguageHint::Chinese),
            "en" | "other" | "english" => Ok(LanguageHint::Other),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// A request for one generated passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The full prompt sent to the backend.
    pub prompt_text: String,
    pub language_hint: LanguageHint,
    pub topic_hint: String,
    #[serde(default)]
    pub extra_instructions: Option<String>,
}

/// Text produced by whichever backend answered first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub raw_text: String,
    /// Name of the model that produced the text.
    pub source_model_name: String,
    /// Set when the backend hit its token limit and the text was cut back
    /// to the last complete sentence.
    pub was_truncated: bool,
}

/// The kind of material a drill focuses on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseType {
    #[serde(rename = "숫자 중심")]
    Numbers,
    #[serde(rename = "인명/지명")]
    NamesAndPlaces,
    #[serde(rename = "목록/순서")]
    ListsAndOrder,
    #[serde(rename = "과정/절차")]
    Processes,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 4] = [
        ExerciseType::Numbers,
        ExerciseType::NamesAndPlaces,
        ExerciseType::ListsAndOrder,
        ExerciseType::Processes,
    ];

    /// Label shown to trainees and sent in prompts.
    pub fn label(self) -> &'static str {
        match self {
            ExerciseType::Numbers => "숫자 중심",
            ExerciseType::NamesAndPlaces => "인명/지명",
            ExerciseType::ListsAndOrder => "목록/순서",
            ExerciseType::Processes => "과정/절차",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "numbers" | "숫자 중심" => Ok(ExerciseType::Numbers),
            "names" | "인명/지명" => Ok(ExerciseType::NamesAndPlaces),
            "lists" | "목록/순서" => Ok(ExerciseType::ListsAndOrder),
            "process" | "과정/절차" => Ok(ExerciseType::Processes),
            other => Err(format!(
                "unknown exercise type: {other} (expected numbers, names, lists, or process)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// A generated passage ready to be memorized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseContent {
    pub script: String,
    pub key_points: KeywordSet,
    pub duration_secs: u32,
    pub exercise_type: ExerciseType,
    pub difficulty: Difficulty,
}
