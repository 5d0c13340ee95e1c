//! Client for an OpenAI-compatible `/chat/completions` and `/embeddings` API.

use std::time::Duration;

use async_trait::async_trait;
use brandkit_core::truncated_body;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::LlmError;
use crate::model::LanguageModel;
use crate::types::{ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, WireMessage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Maximum number of texts per `/embeddings` call.
const EMBEDDING_BATCH_SIZE: usize = 64;

pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    embedding_model: String,
    batch_size: usize,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, embedding_model: &str) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(180))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: embedding_model.to_string(),
            batch_size: EMBEDDING_BATCH_SIZE,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: truncated_body(&text),
            });
        }
        serde_json::from_str(&text).map_err(|source| LlmError::Deserialize {
            context: path.to_string(),
            source,
        })
    }

    async fn complete(&self, model: &str, messages: Vec<WireMessage>) -> Result<String, LlmError> {
        let request = ChatRequest { model, messages };
        let response: ChatResponse = self.post("chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyResponse {
                model: model.to_string(),
            })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn chat(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        tracing::debug!(model, prompt_chars = prompt.len(), "chat request");
        self.complete(model, vec![WireMessage::user(prompt)]).await
    }

    async fn vision(
        &self,
        prompt: &str,
        images: &[String],
        model: &str,
    ) -> Result<String, LlmError> {
        tracing::debug!(model, images = images.len(), "vision request");
        let messages = std::iter::once(WireMessage::system(prompt))
            .chain(images.iter().map(|url| WireMessage::user_image(url.as_str())))
            .collect();
        self.complete(model, messages).await
    }

    async fn embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let mut all = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let request = EmbeddingRequest {
                model: &self.embedding_model,
                input: chunk,
            };
            let mut response: EmbeddingResponse = self.post("embeddings", &request).await?;
            if response.data.len() != chunk.len() {
                return Err(LlmError::EmbeddingCountMismatch {
                    expected: chunk.len(),
                    got: response.data.len(),
                });
            }
            response.data.sort_by_key(|d| d.index);
            all.extend(response.data.into_iter().map(|d| d.embedding));
        }
        Ok(all)
    }
}
