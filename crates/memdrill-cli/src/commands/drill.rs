//! The `memdrill drill` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use memdrill_core::model::{ExerciseType, LanguageHint};
use memdrill_core::step::MemorizationStep;
use memdrill_core::timer::{format_clock, TimerEvent};
use memdrill_core::traits::UserContext;
use memdrill_providers::config::load_config_from;
use memdrill_providers::ProviderFallbackInvoker;

use crate::history::{local_user, HistoryFile};

pub async fn execute(
    exercise_type: ExerciseType,
    language: LanguageHint,
    prompt: Option<String>,
    duration: Option<u32>,
    history: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let invoker = ProviderFallbackInvoker::from_config(&config)?;
    let duration = duration.unwrap_or(config.duration_secs);
    if duration == 0 {
        anyhow::bail!("--duration must be at least 1 second");
    }

    let mut step = MemorizationStep::new(duration);
    step.select(exercise_type, language, prompt.unwrap_or_default());

    println!("Generating a {exercise_type} passage in {}...", language.label());
    let content = step.generate(&invoker).await?;
    println!();
    println!("{}", content.script);
    println!();

    step.start_timer();
    let mut stdout = std::io::stdout();
    print!("\rTime left {}", format_clock(duration));
    stdout.flush()?;

    loop {
        tokio::select! {
            event = step.next_tick() => match event {
                Some(TimerEvent::Ticked { remaining }) => {
                    print!("\rTime left {}", format_clock(remaining));
                    stdout.flush()?;
                }
                Some(TimerEvent::Completed) | None => break,
                Some(_) => {}
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("study time ended early");
                break;
            }
        }
    }

    let store = HistoryFile::new(history.clone().unwrap_or_default());
    let user: Option<UserContext> = history.as_ref().map(|_| local_user());
    let handoff = step
        .complete(&user, &store)
        .await
        .context("drill ended without a passage")?;

    // Hide the passage before showing what to recall.
    print!("\x1b[2J\x1b[H");
    println!("Time's up. {}", handoff.title);
    println!();
    println!("Key points to recall:");
    for (i, point) in handoff.key_points.iter().enumerate() {
        println!("  {}. {point}", i + 1);
    }
    if let Some(path) = &history {
        println!();
        println!("Session history: {}", path.display());
    }

    Ok(())
}
