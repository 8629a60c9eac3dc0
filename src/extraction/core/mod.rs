//! Core extraction types: configuration, errors, and records.

pub mod config;
pub mod errors;
pub mod records;

pub use config::{
    ExtractionConfig, ExtractorMode, FallbackPolicy, LlmConfig, ModeParseError, RuleConfig,
    StorageConfig,
};
pub use errors::{ExtractError, ExtractResult};
pub use records::{ActionItemRecord, ApplyOutcome, NoteRecord};
