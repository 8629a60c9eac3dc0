//! Text-generation seam for the model-based strategy (Rig + Ollama).

use std::future::Future;
use std::pin::Pin;

use reqwest::Client as ReqwestClient;
use rig::client::{CompletionClient, Nothing};
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::ollama;

use crate::extraction::core::config::LlmConfig;
use crate::extraction::core::errors::{ExtractError, ExtractResult};

/// Boxed future type for text generation.
pub type GenerateFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One-shot text generation with a fixed preamble.
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for `prompt` under the system `preamble`.
    ///
    /// # Errors
    /// Returns an error if the client or the completion call fails.
    fn generate<'a>(
        &'a self,
        preamble: &'a str,
        prompt: &'a str,
    ) -> GenerateFuture<'a, ExtractResult<String>>;
}

/// Ollama completion model via Rig.
#[derive(Clone)]
pub struct OllamaGenerator {
    model: ollama::CompletionModel,
    temperature: f64,
}

impl OllamaGenerator {
    /// Create a generator from the model config.
    ///
    /// # Errors
    /// Returns an error if the Ollama client cannot be built.
    pub fn new(llm: &LlmConfig) -> ExtractResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(Nothing);
        let builder = if let Some(base_url) = &llm.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(ExtractError::from)?;
        let model = client.completion_model(llm.model.clone());
        Ok(Self {
            model,
            temperature: llm.temperature,
        })
    }
}

impl TextGenerator for OllamaGenerator {
    fn generate<'a>(
        &'a self,
        preamble: &'a str,
        prompt: &'a str,
    ) -> GenerateFuture<'a, ExtractResult<String>> {
        Box::pin(async move {
            let request = self
                .model
                .completion_request(prompt.to_string())
                .preamble(preamble.to_string())
                .temperature(self.temperature)
                .build();

            let response = self.model.completion(request).await?;
            Ok(extract_text(&response.choice))
        })
    }
}

fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}
