//! memdrill CLI: timed memory drills for interpreter trainees.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use memdrill_core::model::{ExerciseType, LanguageHint};

mod commands;
mod history;

#[derive(Parser)]
#[command(name = "memdrill", version, about = "Timed memory drills for interpreter trainees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a passage and print it with its key points
    Generate {
        /// Exercise type: numbers, names, lists, process
        #[arg(long = "type", value_name = "TYPE")]
        exercise_type: ExerciseType,

        /// Passage language: ko or zh
        #[arg(long, default_value = "ko")]
        language: LanguageHint,

        /// Extra requirements appended to the prompt
        #[arg(long)]
        prompt: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Extract key points from text
    Keywords {
        /// Text to distill (reads stdin when neither TEXT nor --file is given)
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run a timed memorization drill
    Drill {
        /// Exercise type: numbers, names, lists, process
        #[arg(long = "type", value_name = "TYPE")]
        exercise_type: ExerciseType,

        /// Passage language: ko or zh
        #[arg(long, default_value = "ko")]
        language: LanguageHint,

        /// Extra requirements appended to the prompt
        #[arg(long)]
        prompt: Option<String>,

        /// Study time in seconds (default from config)
        #[arg(long)]
        duration: Option<u32>,

        /// Append the finished session to this JSON-lines file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List candidate models in fallback order
    ListModels {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memdrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            exercise_type,
            language,
            prompt,
            config,
            json,
        } => commands::generate::execute(exercise_type, language, prompt, config, json).await,
        Commands::Keywords { text, file, json } => commands::keywords::execute(text, file, json),
        Commands::Drill {
            exercise_type,
            language,
            prompt,
            duration,
            history,
            config,
        } => {
            commands::drill::execute(exercise_type, language, prompt, duration, history, config)
                .await
        }
        Commands::ListModels { config } => commands::list_models::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
