//! Action-item extraction: rule-based and model-based strategies over free-form text.

pub mod core;
pub mod engine;
pub mod model;
pub mod rules;
pub mod strategy;

pub use self::core::{
    ActionItemRecord, ApplyOutcome, ExtractError, ExtractResult, ExtractionConfig, ExtractorMode,
    FallbackPolicy, LlmConfig, NoteRecord, RuleConfig, StorageConfig,
};
pub use engine::{ActionItemEngine, ApplyRequest, ExtractionReport, apply_action_items};
pub use model::{LlmActionExtractor, OllamaGenerator, TextGenerator};
pub use rules::{RuleExtractor, extract_action_items};
pub use strategy::{ActionItemExtractor, ExtractFuture, build_extractor};
