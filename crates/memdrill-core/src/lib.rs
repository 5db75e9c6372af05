//! memdrill-core: Data model, keyword distillation, and study-step logic.
//!
//! This crate defines the exercise data model, the error taxonomy for text
//! generation, the collaborator traits, and the pure logic (keyword
//! extraction, study timer, memorization step) the rest of memdrill builds on.

pub mod error;
pub mod keywords;
pub mod model;
pub mod prompt;
pub mod session;
pub mod step;
pub mod timer;
pub mod traits;

pub use error::GenerationError;
pub use keywords::{detect_script, extract, KeywordSet};
