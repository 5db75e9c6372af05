//! The `memdrill generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use memdrill_core::model::{ExerciseContent, ExerciseType, LanguageHint};
use memdrill_core::step::MemorizationStep;
use memdrill_providers::config::load_config_from;
use memdrill_providers::ProviderFallbackInvoker;

#[derive(Serialize)]
struct GenerateOutput<'a> {
    model: &'a str,
    language: LanguageHint,
    #[serde(flatten)]
    content: &'a ExerciseContent,
}

pub async fn execute(
    exercise_type: ExerciseType,
    language: LanguageHint,
    prompt: Option<String>,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let invoker = ProviderFallbackInvoker::from_config(&config)?;

    let mut step = MemorizationStep::new(config.duration_secs);
    step.select(exercise_type, language, prompt.unwrap_or_default());
    step.generate(&invoker).await?;

    let model = step.used_model().unwrap_or("unknown");
    let content = step.content().context("generator returned no passage")?;

    if json {
        let output = GenerateOutput {
            model,
            language,
            content,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} ({}, via {model})", exercise_type, language.label());
    println!();
    println!("{}", content.script);
    println!();
    println!("Key points:");
    for (i, point) in content.key_points.iter().enumerate() {
        println!("  {}. {point}", i + 1);
    }

    Ok(())
}
