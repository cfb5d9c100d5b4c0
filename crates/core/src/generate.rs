//! Adapter to the external text-completion service.
//!
//! The service is reached through the [`CompletionService`] trait so the
//! pipeline can run against an in-memory fake. [`OpenAiClient`] talks to any
//! OpenAI-compatible endpoint: `GET {base}/models` is the credential probe and
//! `POST {base}/chat/completions` produces the text.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::GenerationError;
use crate::prompt::RenderedPrompt;

/// API key for the completion service.
///
/// `Debug` output is redacted; use [`Credential::fingerprint`] in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First eight hex digits of the key's SHA-256 digest.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

/// Text-completion capability.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Lists available models. Used as a cheap credential check.
    async fn list_models(&self, credential: &Credential) -> Result<Vec<String>, GenerationError>;

    /// Returns the generated text of the first choice.
    async fn complete(&self, credential: &Credential, request: &CompletionRequest) -> Result<String, GenerationError>;
}

/// Model and output bound used for every generation call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { model: "gpt-4o-mini".to_string(), max_tokens: 1000 }
    }
}

/// Sends rendered prompts to a [`CompletionService`].
#[derive(Clone)]
pub struct GenerationAdapter {
    service: Arc<dyn CompletionService>,
    settings: GenerationSettings,
}

impl GenerationAdapter {
    pub fn new(service: Arc<dyn CompletionService>, settings: GenerationSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Checks a credential by listing models.
    pub async fn probe(&self, credential: &Credential) -> Result<(), GenerationError> {
        if credential.is_empty() {
            return Err(GenerationError::AuthInvalid);
        }

        let models = self.service.list_models(credential).await?;
        tracing::debug!(key = %credential.fingerprint(), models = models.len(), "credential accepted");
        Ok(())
    }

    /// Generates text for `prompt`. A single attempt, never retried.
    pub async fn generate(&self, credential: &Credential, prompt: &RenderedPrompt) -> Result<String, GenerationError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            max_tokens: self.settings.max_tokens,
        };

        self.service.complete(credential, &request).await
    }
}

impl fmt::Debug for GenerationAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationAdapter").field("settings", &self.settings).finish()
    }
}

/// Maps a non-success HTTP status to a [`GenerationError`].
pub fn classify_status(status: u16, detail: &str) -> GenerationError {
    match status {
        401 | 403 => GenerationError::AuthInvalid,
        408 | 429 | 500..=599 => GenerationError::ServiceUnavailable(format!("HTTP {}: {}", status, detail)),
        _ => GenerationError::Unknown(format!("HTTP {}: {}", status, detail)),
    }
}

#[cfg(feature = "fetch")]
pub use client::OpenAiClient;

#[cfg(feature = "fetch")]
mod client {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use serde::{Deserialize, Serialize};

    use super::{CompletionRequest, CompletionService, Credential, classify_status};
    use crate::error::GenerationError;

    #[derive(Serialize)]
    struct ChatMessage<'a> {
        role: &'a str,
        content: &'a str,
    }

    #[derive(Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: [ChatMessage<'a>; 2],
        max_tokens: u32,
    }

    #[derive(Deserialize)]
    struct ChatResponse {
        #[serde(default)]
        choices: Vec<ChatChoice>,
    }

    #[derive(Deserialize)]
    struct ChatChoice {
        message: ChatReply,
    }

    #[derive(Deserialize)]
    struct ChatReply {
        content: Option<String>,
    }

    #[derive(Deserialize)]
    struct ModelList {
        #[serde(default)]
        data: Vec<ModelEntry>,
    }

    #[derive(Deserialize)]
    struct ModelEntry {
        id: String,
    }

    /// Client for OpenAI-compatible chat-completion endpoints.
    #[derive(Debug, Clone)]
    pub struct OpenAiClient {
        http: Client,
        base_url: String,
    }

    impl OpenAiClient {
        /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
        pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, GenerationError> {
            let http = Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| GenerationError::Unknown(e.to_string()))?;

            Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string() })
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        async fn check(response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let detail = response.text().await.unwrap_or_default();
            Err(classify_status(status.as_u16(), detail.trim()))
        }
    }

    fn transport_error(e: reqwest::Error) -> GenerationError {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            GenerationError::ServiceUnavailable(e.to_string())
        } else {
            GenerationError::Unknown(e.to_string())
        }
    }

    #[async_trait]
    impl CompletionService for OpenAiClient {
        async fn list_models(&self, credential: &Credential) -> Result<Vec<String>, GenerationError> {
            let response = self
                .http
                .get(format!("{}/models", self.base_url))
                .bearer_auth(credential.expose())
                .send()
                .await
                .map_err(transport_error)?;

            let list: ModelList = Self::check(response).await?.json().await.map_err(transport_error)?;
            Ok(list.data.into_iter().map(|m| m.id).collect())
        }

        async fn complete(
            &self,
            credential: &Credential,
            request: &CompletionRequest,
        ) -> Result<String, GenerationError> {
            let body = ChatRequest {
                model: &request.model,
                messages: [
                    ChatMessage { role: "system", content: &request.system },
                    ChatMessage { role: "user", content: &request.user },
                ],
                max_tokens: request.max_tokens,
            };

            let response = self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(credential.expose())
                .json(&body)
                .send()
                .await
                .map_err(transport_error)?;

            let reply: ChatResponse = Self::check(response).await?.json().await.map_err(transport_error)?;

            reply
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| GenerationError::Unknown("response contained no generated text".to_string()))
        }
    }
}
