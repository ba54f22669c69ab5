//! Command-line entry point — Voice Ledger.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (defaults when the file does not exist yet).
//! 3. Build the [`InterpretContext`] from `--context` or from config.
//! 4. Build the [`ActionResolver`] (remote oracle only when configured and
//!    not `--offline`).
//! 5. Resolve the utterance and print the action as JSON on stdout.

use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use voice_ledger::{
    config::{AppConfig, AppPaths},
    pipeline::{ActionResolver, InterpretContext},
};

#[derive(Parser)]
#[command(name = "voice-ledger")]
#[command(about = "Turn a Thai/English finance command into a structured action")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file with the caller's snapshot (balances, accounts, ...)
    #[arg(long)]
    context: Option<PathBuf>,

    /// Text file produced by OCR from a slip or receipt
    #[arg(long)]
    ocr: Option<PathBuf>,

    /// Skip the language model and use local rules only
    #[arg(long)]
    offline: bool,

    /// The utterance; read from stdin when omitted
    text: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // 2. Configuration
    let (config, paths) = match &cli.config {
        Some(path) => (
            AppConfig::load_from(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            AppPaths::for_settings_file(path),
        ),
        None => {
            let config = AppConfig::load().unwrap_or_else(|e| {
                log::warn!("Failed to load config ({e}); using defaults");
                AppConfig::default()
            });
            (config, AppPaths::new())
        }
    };

    // 3. Context
    let mut ctx = match &cli.context {
        Some(path) => load_context(path, &config)?,
        None => InterpretContext::from_config(&config.interpreter),
    };
    if let Some(path) = &cli.ocr {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read OCR text {}", path.display()))?;
        ctx = ctx.with_ocr_text(text);
    }

    let utterance = if cli.text.is_empty() && !ctx.is_ocr() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read utterance from stdin")?;
        buf
    } else {
        cli.text.join(" ")
    };
    if utterance.trim().is_empty() && !ctx.is_ocr() {
        bail!("nothing to interpret: pass TEXT, pipe it on stdin, or use --ocr");
    }

    // 4. Resolver
    let resolver = ActionResolver::from_config(&config, &paths, cli.offline);

    // 5. Resolve
    let action = resolver.resolve(utterance.trim(), &ctx).await;
    println!("{}", serde_json::to_string_pretty(&action)?);
    Ok(())
}

/// Read a JSON snapshot; fields it leaves out come from config.
fn load_context(path: &std::path::Path, config: &AppConfig) -> Result<InterpretContext> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read context {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))?;
    let ctx: InterpretContext = serde_json::from_value(value.clone())
        .with_context(|| format!("invalid context in {}", path.display()))?;
    Ok(ctx.with_defaults_from(&config.interpreter, &value))
}
