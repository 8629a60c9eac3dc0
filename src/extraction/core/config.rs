//! Configuration for the extraction subsystem.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::extraction::core::errors::{ExtractError, ExtractResult};

/// Environment variable selecting the extraction strategy (`rules` or `llm`).
pub const MODE_ENV: &str = "ACTION_ITEMS_MODE";
/// Environment variable overriding the completion model name.
pub const MODEL_ENV: &str = "ACTION_ITEMS_MODEL";
/// Environment variable overriding the Ollama base URL.
pub const OLLAMA_URL_ENV: &str = "ACTION_ITEMS_OLLAMA_URL";
/// Environment variable overriding the per-call model timeout.
pub const TIMEOUT_ENV: &str = "ACTION_ITEMS_TIMEOUT_SECS";
/// Environment variable overriding the `SQLite` database path.
pub const DB_ENV: &str = "ACTION_ITEMS_DB";

/// Top-level configuration for extraction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which strategy callers get from `build_extractor`.
    pub mode: ExtractorMode,
    /// Rule-engine thresholds and fallback policy.
    pub rules: RuleConfig,
    /// Completion model settings.
    pub llm: LlmConfig,
    /// Storage settings for the persistence boundary.
    pub storage: StorageConfig,
}

impl ExtractionConfig {
    /// Load a configuration file (JSON). Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> ExtractResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Apply `ACTION_ITEMS_*` environment overrides.
    ///
    /// # Errors
    /// Returns an error if an override cannot be parsed.
    pub fn with_env_overrides(self) -> ExtractResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (environment in production).
    fn with_overrides<F>(mut self, lookup: F) -> ExtractResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(MODE_ENV) {
            self.mode = mode
                .parse()
                .map_err(|err: ModeParseError| ExtractError::InvalidConfig(err.to_string()))?;
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.llm.model = model;
        }
        if let Some(base_url) = lookup(OLLAMA_URL_ENV) {
            self.llm.base_url = Some(base_url);
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            self.llm.timeout_secs = timeout.trim().parse().map_err(|_| {
                ExtractError::InvalidConfig(format!("{TIMEOUT_ENV} must be an integer, got {timeout:?}"))
            })?;
        }
        if let Some(path) = lookup(DB_ENV) {
            self.storage.sqlite_path = PathBuf::from(path);
        }
        Ok(self)
    }

    /// Validate the whole configuration.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ExtractResult<()> {
        self.rules.validate()?;
        self.llm.validate()?;

        if self.storage.notes_table.trim().is_empty() || self.storage.items_table.trim().is_empty()
        {
            return Err(ExtractError::InvalidConfig(
                "storage table names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Extraction strategy selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorMode {
    /// Rule-based pattern tables.
    #[default]
    Rules,
    /// Model-based extraction through a local LLM.
    Llm,
}

impl ExtractorMode {
    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Llm => "llm",
        }
    }
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown extractor mode {0:?} (expected \"rules\" or \"llm\")")]
pub struct ModeParseError(pub String);

impl FromStr for ExtractorMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" | "heuristic" => Ok(Self::Rules),
            "llm" | "model" => Ok(Self::Llm),
            other => Err(ModeParseError(other.to_string())),
        }
    }
}

/// What the rule engine does when no line-level rule matched anywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Return the (empty) primary result.
    #[default]
    Disabled,
    /// Re-scan the whole text as sentences and keep imperative-led ones.
    ImperativeSentences,
}

/// Rule-engine thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Minimum characters for an unmarked fragment.
    pub min_fragment_chars: usize,
    /// Minimum word tokens for an unmarked fragment.
    pub min_fragment_words: usize,
    /// Minimum word tokens for a fragment introduced by a list or checkbox marker.
    pub min_marked_words: usize,
    /// Minimum characters for a `!`-terminated fragment to count as actionable.
    pub exclamation_min_chars: usize,
    /// Second-pass policy.
    pub fallback: FallbackPolicy,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_fragment_chars: 12,
            min_fragment_words: 3,
            min_marked_words: 2,
            exclamation_min_chars: 12,
            fallback: FallbackPolicy::Disabled,
        }
    }
}

impl RuleConfig {
    /// Validate rule thresholds.
    ///
    /// # Errors
    /// Returns an error if a threshold would accept empty fragments.
    pub fn validate(&self) -> ExtractResult<()> {
        if self.min_fragment_words == 0 || self.min_marked_words == 0 {
            return Err(ExtractError::InvalidConfig(
                "rules word thresholds must be > 0".to_string(),
            ));
        }

        if self.exclamation_min_chars == 0 {
            return Err(ExtractError::InvalidConfig(
                "rules.exclamation_min_chars must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Completion model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama completion model name.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Optional custom base URL.
    pub base_url: Option<String>,
    /// Per-call deadline in seconds.
    pub timeout_secs: u64,
    /// Max model-proposed items kept per call.
    pub max_items: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "phi3:mini".to_string(),
            temperature: 0.3,
            base_url: None,
            timeout_secs: 8,
            max_items: 64,
        }
    }
}

impl LlmConfig {
    /// Per-call deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate model settings.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or the URL is invalid.
    pub fn validate(&self) -> ExtractResult<()> {
        if self.model.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ExtractError::InvalidConfig(
                "llm.temperature must be within 0.0..=2.0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "llm.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.max_items == 0 {
            return Err(ExtractError::InvalidConfig(
                "llm.max_items must be > 0".to_string(),
            ));
        }

        if let Some(base_url) = &self.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

/// Storage configuration for notes and persisted action items.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` database path (`:memory:` for a private in-memory database).
    pub sqlite_path: PathBuf,
    /// Notes table name.
    pub notes_table: String,
    /// Action items table name.
    pub items_table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("action_items.sqlite"),
            notes_table: "notes".to_string(),
            items_table: "action_items".to_string(),
        }
    }
}

impl StorageConfig {
    /// Storage settings for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: PathBuf::from(":memory:"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractionConfig::default();
        assert_eq!(config.mode, ExtractorMode::Rules);
        assert_eq!(config.rules.fallback, FallbackPolicy::Disabled);
        assert_eq!(config.llm.model, "phi3:mini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{"mode":"llm","rules":{"fallback":"imperative_sentences"}}"#)
                .unwrap();
        assert_eq!(config.mode, ExtractorMode::Llm);
        assert_eq!(config.rules.fallback, FallbackPolicy::ImperativeSentences);
        assert_eq!(config.rules.min_fragment_chars, 12);
        assert_eq!(config.llm.timeout_secs, 8);
    }

    #[test]
    fn test_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (MODE_ENV, "LLM"),
            (MODEL_ENV, "llama3.2:3b"),
            (OLLAMA_URL_ENV, "http://10.0.0.5:11434"),
            (TIMEOUT_ENV, "4"),
        ]);
        let config = ExtractionConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.mode, ExtractorMode::Llm);
        assert_eq!(config.llm.model, "llama3.2:3b");
        assert_eq!(config.llm.timeout(), Duration::from_secs(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let result = ExtractionConfig::default().with_overrides(|key| {
            (key == MODE_ENV).then(|| "semantic".to_string())
        });
        assert!(matches!(result, Err(ExtractError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ExtractionConfig::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractionConfig::default();
        config.llm.base_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(ExtractError::Url(_))));

        let mut config = ExtractionConfig::default();
        config.rules.min_marked_words = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("rules".parse::<ExtractorMode>().unwrap(), ExtractorMode::Rules);
        assert_eq!(" Model ".parse::<ExtractorMode>().unwrap(), ExtractorMode::Llm);
        assert!("nlp".parse::<ExtractorMode>().is_err());
        assert_eq!(ExtractorMode::Llm.to_string(), "llm");
    }
}
