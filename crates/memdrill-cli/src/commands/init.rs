//! The `memdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("memdrill.toml").exists() {
        println!("memdrill.toml already exists, skipping.");
    } else {
        std::fs::write("memdrill.toml", SAMPLE_CONFIG)?;
        println!("Created memdrill.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY and/or OPENAI_API_KEY (or edit memdrill.toml)");
    println!("  2. Run: memdrill list-models");
    println!("  3. Run: memdrill drill --type numbers --language ko");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# memdrill configuration

# Seconds a trainee gets to memorize each passage.
duration_secs = 60

# Per-request HTTP timeout in seconds.
timeout_secs = 60

[credentials]
# Gemini models are tried first; chat-completion models only need this
# when you want them as fallbacks.
gemini_api_key = "${GEMINI_API_KEY}"
openai_api_key = "${OPENAI_API_KEY}"

# Uncomment to replace the built-in fallback order (at most 7 are tried).
#
# [[models]]
# name = "gemini-2.5-flash"
# endpoint = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
# request_shape = "gemini"
#
# [models.generation]
# temperature = 0.3
# top_k = 40
# top_p = 0.95
# max_output_tokens = 2048
"#;
