//! Entry helpers for the `action-items` binary.
//!
//! Logs go to stderr; stdout carries only the JSON result.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;
use crate::extraction::core::config::ExtractionConfig;
use crate::extraction::engine::{ActionItemEngine, ApplyRequest};
use crate::extraction::strategy::build_extractor;

/// Parse arguments, run one extraction, and print the result.
///
/// # Returns
/// `ExitCode::SUCCESS` on success, `1` on configuration, I/O or storage errors.
#[must_use]
pub fn run() -> ExitCode {
    let args = CliArgs::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(execute(args)) {
        tracing::error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Resolve configuration: file, then environment, then flags.
///
/// # Errors
/// Returns an error if the file cannot be read or a value is invalid.
pub fn load_config(args: &CliArgs) -> Result<ExtractionConfig> {
    let config = match &args.config {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    let config = config
        .with_env_overrides()
        .context("invalid environment override")?;
    let config = args.apply_overrides(config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn execute(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;
    tracing::debug!("Extractor mode: {}", config.mode);

    let mut out = io::stdout().lock();

    if !args.uses_store() {
        let extractor = build_extractor(&config).context("failed to build extractor")?;
        let text = read_input(&args)?;
        let items = extractor.extract(&text).await;
        serde_json::to_writer_pretty(&mut out, &items)?;
        writeln!(out)?;
        return Ok(());
    }

    let engine = ActionItemEngine::from_config(&config)
        .await
        .context("failed to initialize engine")?;
    let report = if let Some(note_id) = args.note {
        engine.extract_note(note_id, args.apply).await?
    } else {
        let text = read_input(&args)?;
        let request = ApplyRequest {
            title: args.title.clone(),
            apply: args.apply,
        };
        engine.extract_and_apply(&text, request).await?
    };
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn read_input(args: &CliArgs) -> Result<String> {
    match &args.input {
        Some(path) if !args.reads_stdin() => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
