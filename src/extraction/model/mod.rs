//! Model-based extraction: generation seam, reply parsing and the extractor.

pub mod extractor_llm;
pub mod generator;
pub mod reply;

pub use extractor_llm::{LlmActionExtractor, SYSTEM_PROMPT, user_prompt};
pub use generator::{GenerateFuture, OllamaGenerator, TextGenerator};
pub use reply::parse_action_items_reply;
