//! Command-line arguments for the `action-items` binary.
//!
//! Priority: CLI flags > environment variables > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::extraction::core::config::{ExtractionConfig, ExtractorMode, FallbackPolicy};

/// Extract action items from free-form notes.
#[derive(Parser, Debug)]
#[command(name = "action-items", version, about)]
pub struct CliArgs {
    /// Input file (`-` or omitted reads stdin).
    pub input: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Extraction strategy (`rules` or `llm`).
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<ExtractorMode>,

    /// Ollama model name for the `llm` strategy.
    #[arg(long = "model")]
    pub model: Option<String>,

    /// Ollama base URL.
    #[arg(long = "ollama-url")]
    pub ollama_url: Option<String>,

    /// Per-call model deadline in seconds.
    #[arg(long = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// Re-scan imperative sentences when no rule matches.
    #[arg(long = "fallback")]
    pub fallback: bool,

    /// `SQLite` database for notes and persisted items.
    #[arg(long = "db")]
    pub db: Option<PathBuf>,

    /// Save the input as a note with this title.
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,

    /// Persist extracted items, skipping ones already stored.
    #[arg(short = 'a', long = "apply")]
    pub apply: bool,

    /// Re-extract a stored note instead of reading input.
    #[arg(long = "note", conflicts_with_all = ["input", "title"])]
    pub note: Option<i64>,

    /// Log level when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", default_value = "warn")]
    pub log_level: String,
}

impl CliArgs {
    /// Whether the run needs the store.
    #[must_use]
    pub const fn uses_store(&self) -> bool {
        self.apply || self.title.is_some() || self.note.is_some()
    }

    /// Whether input comes from stdin.
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.input
            .as_ref()
            .is_none_or(|path| path.as_os_str() == "-")
    }

    /// Layer flag overrides on top of `config`.
    #[must_use]
    pub fn apply_overrides(&self, mut config: ExtractionConfig) -> ExtractionConfig {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(model) = &self.model {
            config.llm.model.clone_from(model);
        }
        if let Some(url) = &self.ollama_url {
            config.llm.base_url = Some(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.llm.timeout_secs = secs;
        }
        if self.fallback {
            config.rules.fallback = FallbackPolicy::ImperativeSentences;
        }
        if let Some(db) = &self.db {
            config.storage.sqlite_path.clone_from(db);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "action-items",
            "notes.md",
            "--mode",
            "llm",
            "--model",
            "llama3",
            "--timeout-secs",
            "3",
            "--fallback",
            "--db",
            "items.sqlite",
            "--apply",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("notes.md")));
        assert!(args.uses_store());
        assert!(!args.reads_stdin());

        let config = args.apply_overrides(ExtractionConfig::default());
        assert_eq!(config.mode, ExtractorMode::Llm);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.timeout_secs, 3);
        assert_eq!(config.rules.fallback, FallbackPolicy::ImperativeSentences);
        assert_eq!(config.storage.sqlite_path, PathBuf::from("items.sqlite"));
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["action-items"]).unwrap();
        assert!(args.reads_stdin());
        assert!(!args.uses_store());
        assert_eq!(args.log_level, "warn");
        let config = args.apply_overrides(ExtractionConfig::default());
        assert_eq!(config.mode, ExtractorMode::Rules);
        assert_eq!(config.rules.fallback, FallbackPolicy::Disabled);
    }

    #[test]
    fn test_dash_reads_stdin() {
        let args = CliArgs::try_parse_from(["action-items", "-"]).unwrap();
        assert!(args.reads_stdin());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(CliArgs::try_parse_from(["action-items", "--mode", "magic"]).is_err());
    }

    #[test]
    fn test_note_conflicts_with_input() {
        assert!(CliArgs::try_parse_from(["action-items", "notes.md", "--note", "3"]).is_err());
    }
}
