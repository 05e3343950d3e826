//! `polyglot` - run title restoration and audio-track selection over JSON files.
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::json;

use polyglot_core::config::AppConfig;
use polyglot_core::detect;
use polyglot_core::models::{AudioMetadata, VideoItem};
use polyglot_core::preferences::MemoryPreferences;
use polyglot_runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "polyglot")]
#[command(about = "Restore original-language titles and pick audio tracks")]
#[command(version)]
struct Args {
    /// Config file to use instead of the user config
    #[arg(long, global = true, env = "POLYGLOT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore titles on a JSON array of list items
    Titles {
        file: PathBuf,
        /// Where the list came from (search, subs, trending, ...)
        #[arg(long, default_value = "cli")]
        source: String,
        /// Treat the items as a watch page rather than a list
        #[arg(long)]
        not_list: bool,
    },
    /// Aggregate audio tracks from a JSON metadata object and pick one
    Tracks {
        file: PathBuf,
        #[arg(long)]
        video_id: String,
        /// Overrides `tracks.system_language` from the config
        #[arg(long)]
        system_language: Option<String>,
    },
    /// Guess the language of a piece of text
    Detect { text: String },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polyglot=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let output = match args.command {
        Command::Detect { text } => serde_json::to_value(detect::detect(&text))?,
        Command::Titles {
            file,
            source,
            not_list,
        } => {
            // Title restoration never touches preferences; keep the database closed.
            let runtime = Runtime::with_config(
                load_config(args.config.as_deref())?,
                Box::new(MemoryPreferences::default()),
            );
            let items: Vec<VideoItem> = read_json(&file)?;
            let mut options = runtime.list_options(&source).await;
            options.is_list_context = !not_list;

            let (items, summary) = runtime.restore_titles(items, &options).await;
            json!({ "items": items, "summary": summary })
        }
        Command::Tracks {
            file,
            video_id,
            system_language,
        } => {
            let mut config = load_config(args.config.as_deref())?;
            if let Some(lang) = system_language {
                config.tracks.system_language = lang;
            }
            let runtime = Runtime::open(config)?;
            let metadata: AudioMetadata = read_json(&file)?;

            let (tracks, selected) = runtime.load_tracks(&video_id, Some(&metadata)).await;
            json!({ "videoId": video_id, "tracks": tracks, "selected": selected })
        }
        Command::Config => {
            let runtime = Runtime::with_config(
                load_config(args.config.as_deref())?,
                Box::new(MemoryPreferences::default()),
            );
            serde_json::to_value(runtime.get_config().await)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    config.context("Failed to load config")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
