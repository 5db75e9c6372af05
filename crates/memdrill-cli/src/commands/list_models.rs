//! The `memdrill list-models` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use memdrill_providers::config::load_config_from;
use memdrill_providers::MAX_CANDIDATES;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let candidates = config.candidates();

    let mut table = Table::new();
    table.set_header(vec!["#", "Model", "Family", "Endpoint", "Credential"]);

    for (i, model) in candidates.iter().take(MAX_CANDIDATES).enumerate() {
        let family = model.family();
        let credential = if config.credentials.for_family(family).is_some() {
            "configured"
        } else {
            "missing"
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&model.name),
            Cell::new(family),
            Cell::new(&model.endpoint),
            Cell::new(credential),
        ]);
    }

    println!("{table}");

    if candidates.len() > MAX_CANDIDATES {
        println!(
            "{} more configured model(s) are ignored; at most {MAX_CANDIDATES} are tried.",
            candidates.len() - MAX_CANDIDATES
        );
    }
    if config.credentials.is_empty() {
        println!("No API keys configured. Run `memdrill init` to create a config file.");
    }

    Ok(())
}
