//! Model-based action-item extraction.

use std::time::Duration;

use tracing::{debug, warn};

use crate::extraction::core::config::LlmConfig;
use crate::extraction::core::errors::{ExtractError, ExtractResult};
use crate::extraction::model::generator::{OllamaGenerator, TextGenerator};
use crate::extraction::model::reply::parse_action_items_reply;
use crate::extraction::rules::dedupe::dedupe_preserving_order;

/// System instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You extract action items from notes. \
Output ONLY a JSON array of strings, one string per action item. \
Do not add explanations, numbering or markdown. \
Example: [\"Action item 1\", \"Action item 2\"]. \
Return [] if there are no action items.";

/// Build the user prompt for `text`.
#[must_use]
pub fn user_prompt(text: &str) -> String {
    format!(
        "Extract all action items from the following text. Return ONLY a JSON array of strings, nothing else:\n\n{text}"
    )
}

/// Extractor delegating to a text-generation model.
pub struct LlmActionExtractor<G = OllamaGenerator> {
    generator: G,
    timeout: Duration,
    max_items: usize,
}

impl LlmActionExtractor<OllamaGenerator> {
    /// Create an extractor backed by Ollama.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or the client cannot be built.
    pub fn new(llm: &LlmConfig) -> ExtractResult<Self> {
        llm.validate()?;
        Ok(Self::with_generator(OllamaGenerator::new(llm)?, llm))
    }
}

impl<G: TextGenerator> LlmActionExtractor<G> {
    /// Create an extractor over any generator.
    #[must_use]
    pub const fn with_generator(generator: G, llm: &LlmConfig) -> Self {
        Self {
            generator,
            timeout: llm.timeout(),
            max_items: llm.max_items,
        }
    }

    /// Extract items, surfacing the typed failure.
    ///
    /// # Errors
    /// Returns `Timeout`, transport, `MalformedOutput` or `WrongShape` errors.
    pub async fn try_extract(&self, text: &str) -> ExtractResult<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let prompt = user_prompt(text);
        let generation = self.generator.generate(SYSTEM_PROMPT, &prompt);
        let reply = tokio::time::timeout(self.timeout, generation)
            .await
            .map_err(|_| ExtractError::Timeout(self.timeout))??;
        debug!("Model replied with {} chars", reply.len());

        let mut items = dedupe_preserving_order(parse_action_items_reply(&reply)?);
        items.truncate(self.max_items);
        Ok(items)
    }

    /// Extract items; any failure degrades to an empty list.
    pub async fn extract(&self, text: &str) -> Vec<String> {
        match self.try_extract(text).await {
            Ok(items) => items,
            Err(err) => {
                warn!("Model extraction failed: {err}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::extraction::model::generator::GenerateFuture;

    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct FakeGenerator {
        reply: Reply,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl FakeGenerator {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        fn generate<'a>(
            &'a self,
            preamble: &'a str,
            prompt: &'a str,
        ) -> GenerateFuture<'a, ExtractResult<String>> {
            Box::pin(async move {
                assert_eq!(preamble, SYSTEM_PROMPT);
                self.calls.fetch_add(1, Ordering::SeqCst);
                *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
                match self.reply {
                    Reply::Text(text) => Ok(text.to_string()),
                    Reply::Fail => Err(ExtractError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    ))),
                    Reply::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok("[]".to_string())
                    }
                }
            })
        }
    }

    fn extractor(reply: Reply) -> LlmActionExtractor<FakeGenerator> {
        LlmActionExtractor::with_generator(FakeGenerator::new(reply), &LlmConfig::default())
    }

    #[tokio::test]
    async fn test_parses_reply() {
        let ex = extractor(Reply::Text("```json\n[\"Send the report\", \" Book the room \"]\n```"));
        assert_eq!(ex.extract("notes").await, vec!["Send the report", "Book the room"]);
        let prompt = ex.generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with("Extract all action items"));
        assert!(prompt.ends_with("\n\nnotes"));
    }

    #[tokio::test]
    async fn test_blank_input_skips_call() {
        let ex = extractor(Reply::Text("[\"x\"]"));
        assert!(ex.extract("  \n ").await.is_empty());
        assert_eq!(ex.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty() {
        for reply in [Reply::Text("no json here"), Reply::Text("{\"a\": 1}"), Reply::Fail] {
            let ex = extractor(reply);
            assert!(ex.extract("Send the report").await.is_empty());
            assert_eq!(ex.generator.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_typed_errors() {
        let err = extractor(Reply::Text("nope")).try_extract("x").await.unwrap_err();
        assert!(matches!(err, ExtractError::MalformedOutput(_)));
        let err = extractor(Reply::Text("42")).try_extract("x").await.unwrap_err();
        assert!(matches!(err, ExtractError::WrongShape(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let config = LlmConfig {
            timeout_secs: 1,
            ..LlmConfig::default()
        };
        let ex = LlmActionExtractor::with_generator(FakeGenerator::new(Reply::Hang), &config);
        let err = ex.try_extract("Send the report").await.unwrap_err();
        assert!(matches!(err, ExtractError::Timeout(_)));
        assert!(err.is_strategy_failure());
        assert_eq!(ex.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dedupes_and_caps() {
        let config = LlmConfig {
            max_items: 2,
            ..LlmConfig::default()
        };
        let ex = LlmActionExtractor::with_generator(
            FakeGenerator::new(Reply::Text(r#"["Fix CI", "fix ci", "Email Dana", "Book room"]"#)),
            &config,
        );
        assert_eq!(ex.extract("notes").await, vec!["Fix CI", "Email Dana"]);
    }
}
