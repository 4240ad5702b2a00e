//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, sets up diagnostics, and
//! dispatches to the full-screen client or a one-shot command.

pub mod oneshot;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::oneshot::{run_oneshot, OneShot};
use crate::core::config::Config;
use crate::core::transcript::Transcript;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{init_diagnostics, DiagnosticsTarget, TranscriptLog};

#[derive(Parser)]
#[command(name = "tutorchat")]
#[command(version)]
#[command(about = "A terminal client for grammar-tutor chat backends")]
#[command(
    long_about = "tutorchat connects to a grammar-tutor backend and lets you chat with it, \
request grammar exercises and multiple-choice quizzes, and follow your score.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Ctrl+E            Request an exercise\n\
  Ctrl+Q            Request a quiz\n\
  Up/Down/PgUp/PgDn Scroll through the log\n\
  Esc, Ctrl+C       Quit\n\n\
Diagnostics go to a log file in full-screen mode and to stderr otherwise.\n\
Set RUST_LOG (e.g. RUST_LOG=debug) to change their verbosity."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL (overrides the config file)
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Append every log line to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<PathBuf>,

    /// Where full-screen mode writes diagnostics
    #[arg(long, global = true, value_name = "FILE")]
    pub diagnostics: Option<PathBuf>,

    /// Do not show the progress line
    #[arg(long, global = true)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the full-screen chat interface (default)
    Chat,
    /// Send one message and print the reply
    Say {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    /// Fetch one exercise and print it
    Exercise {
        /// Also print the whole exercise payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch one quiz and print it
    Quiz {
        /// Also print the whole quiz payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set configuration values, or print them when no value is given
    Set {
        /// Configuration key: base-url, progress, timeout
        key: Option<String>,
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key: base-url, progress, timeout
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat);

    match command {
        Commands::Set { key, value } => return set_config(key, value),
        Commands::Unset { key } => return unset_config(&key),
        _ => {}
    }

    let target = match (&command, args.diagnostics) {
        (Commands::Chat, Some(path)) => DiagnosticsTarget::File(path),
        (Commands::Chat, None) => DiagnosticsTarget::File(Config::default_diagnostics_path()?),
        _ => DiagnosticsTarget::Stderr,
    };
    init_diagnostics(&target)?;

    let config = Config::load()?;
    let settings = config.resolve(args.base_url.as_deref(), args.no_progress);
    let transcript = match args.log {
        Some(path) => Transcript::with_export(TranscriptLog::create(path)?),
        None => Transcript::new(),
    };

    match command {
        Commands::Chat => run_chat(settings, transcript).await,
        Commands::Say { message } => {
            let message = say_message(&message)?;
            run_oneshot(settings, OneShot::Say(message), transcript, false).await
        }
        Commands::Exercise { json } => {
            run_oneshot(settings, OneShot::Exercise, transcript, json).await
        }
        Commands::Quiz { json } => run_oneshot(settings, OneShot::Quiz, transcript, json).await,
        Commands::Set { .. } | Commands::Unset { .. } => Ok(()),
    }
}

pub fn say_message(words: &[String]) -> Result<String, String> {
    let message = words.join(" ");
    if message.is_empty() {
        return Err("Usage: tutorchat say <message>".to_string());
    }
    Ok(message)
}

/// The `(key, value)` pair to store, or `None` when `set` should just print.
pub fn setting_to_apply(
    key: Option<String>,
    value: Option<String>,
) -> Result<Option<(String, String)>, String> {
    match (key, value) {
        (Some(key), Some(value)) => Ok(Some((key, value))),
        (Some(key), None) => Err(format!(
            "Missing value for {key} (usage: tutorchat set {key} <value>)"
        )),
        (None, _) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Apply `set <key> <value>` to a config. Returns the confirmation message.
pub fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<String, String> {
    match key {
        "base-url" => {
            let url = crate::utils::url::normalize_base_url(value);
            if url.is_empty() {
                return Err("base-url cannot be empty".to_string());
            }
            config.base_url = Some(url.clone());
            Ok(format!("Set base-url to: {url}"))
        }
        "progress" => {
            let enabled = parse_bool(value).ok_or_else(|| {
                format!("Invalid boolean value: {value} (use on/off, true/false, yes/no)")
            })?;
            config.show_progress = Some(enabled);
            Ok(format!("Set progress to: {}", if enabled { "on" } else { "off" }))
        }
        "timeout" => {
            let secs = value
                .trim_end_matches('s')
                .parse::<u64>()
                .map_err(|_| format!("Invalid timeout: {value} (expected whole seconds)"))?;
            if secs == 0 {
                return Err(
                    "timeout must be at least 1s (use `tutorchat unset timeout` for none)"
                        .to_string(),
                );
            }
            config.request_timeout_secs = Some(secs);
            Ok(format!("Set timeout to: {secs}s"))
        }
        _ => Err(format!("Unknown config key: {key}")),
    }
}

pub fn clear_setting(config: &mut Config, key: &str) -> Result<String, String> {
    match key {
        "base-url" => config.base_url = None,
        "progress" => config.show_progress = None,
        "timeout" => config.request_timeout_secs = None,
        _ => return Err(format!("Unknown config key: {key}")),
    }
    Ok(format!("Unset {key}"))
}

fn set_config(key: Option<String>, value: Option<String>) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    let Some((key, value)) = setting_to_apply(key, value)? else {
        config.print_all();
        return Ok(());
    };

    let message = apply_setting(&mut config, &key, &value)?;
    config.save()?;
    println!("✅ {message}");
    Ok(())
}

fn unset_config(key: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    let message = clear_setting(&mut config, key)?;
    config.save()?;
    println!("✅ {message}");
    Ok(())
}
