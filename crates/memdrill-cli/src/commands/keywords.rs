//! The `memdrill keywords` command.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use memdrill_core::keywords::{detect_script, extract};

pub fn execute(text: Option<String>, file: Option<PathBuf>, json: bool) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("no text to extract key points from");
    }

    let script = detect_script(text);
    let keywords = extract(text);

    if json {
        let output = serde_json::json!({
            "script": script,
            "keywords": keywords,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Script: {script}");
    for (i, word) in keywords.iter().enumerate() {
        println!("  {}. {word}", i + 1);
    }

    Ok(())
}
