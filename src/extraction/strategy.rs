//! Interchangeable extraction strategies.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::extraction::core::config::{ExtractionConfig, ExtractorMode};
use crate::extraction::core::errors::ExtractResult;
use crate::extraction::model::extractor_llm::LlmActionExtractor;
use crate::extraction::model::generator::TextGenerator;
use crate::extraction::rules::extractor_rules::RuleExtractor;

/// Boxed future type for strategy calls.
pub type ExtractFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One string in, ordered list of action items out. Never fails.
pub trait ActionItemExtractor: Send + Sync {
    /// Extract action items from `text`.
    fn extract<'a>(&'a self, text: &'a str) -> ExtractFuture<'a, Vec<String>>;
    /// Which strategy this is.
    fn mode(&self) -> ExtractorMode;
}

impl ActionItemExtractor for RuleExtractor {
    fn extract<'a>(&'a self, text: &'a str) -> ExtractFuture<'a, Vec<String>> {
        let items = Self::extract(self, text);
        Box::pin(std::future::ready(items))
    }

    fn mode(&self) -> ExtractorMode {
        ExtractorMode::Rules
    }
}

impl<G: TextGenerator> ActionItemExtractor for LlmActionExtractor<G> {
    fn extract<'a>(&'a self, text: &'a str) -> ExtractFuture<'a, Vec<String>> {
        Box::pin(Self::extract(self, text))
    }

    fn mode(&self) -> ExtractorMode {
        ExtractorMode::Llm
    }
}

/// Build the strategy selected by `config.mode`.
///
/// # Errors
/// Returns an error if the config is invalid, a rule pattern fails to compile,
/// or the model client cannot be built.
pub fn build_extractor(config: &ExtractionConfig) -> ExtractResult<Arc<dyn ActionItemExtractor>> {
    config.validate()?;
    let extractor: Arc<dyn ActionItemExtractor> = match config.mode {
        ExtractorMode::Rules => Arc::new(RuleExtractor::new(config.rules.clone())?),
        ExtractorMode::Llm => Arc::new(LlmActionExtractor::new(&config.llm)?),
    };
    Ok(extractor)
}
