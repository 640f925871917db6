//! HTTP implementations of the AI provider adapters.
//!
//! Thin request/response clients; provider choice and prompt engineering
//! live behind the configured endpoints, not here. Each client applies the
//! configured timeout and bounded-retry policy.

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use crosscast_common::Language;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{with_retries, TranscriptionProvider, TranslationProvider, SpeechProvider, TranslationResult};
use crate::config::{AdapterPolicy, ProviderEndpoint};

fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::warn!("Failed to build HTTP client with timeout: {}", e);
        Client::new()
    })
}

/// Speech-to-text over a JSON/bytes HTTP endpoint.
pub struct HttpTranscriptionProvider {
    client: Client,
    endpoint: ProviderEndpoint,
    retries: u32,
    backoff: Duration,
}

impl HttpTranscriptionProvider {
    pub fn new(endpoint: ProviderEndpoint, policy: &AdapterPolicy) -> Self {
        Self {
            client: build_client(policy.timeout()),
            endpoint,
            retries: policy.retries,
            backoff: policy.backoff(),
        }
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl TranscriptionProvider for HttpTranscriptionProvider {
    async fn transcribe(&self, audio: Bytes, language: Language) -> anyhow::Result<String> {
        let response: TranscriptionResponse = with_retries(self.retries, self.backoff, || {
            let client = self.client.clone();
            let url = self.endpoint.url.clone();
            let api_key = self.endpoint.api_key.clone();
            let model = self.endpoint.model.clone();
            let audio = audio.clone();
            async move {
                let mut request = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .query(&[("language", language.to_string())])
                    .body(audio);
                if let Some(model) = &model {
                    request = request.query(&[("model", model)]);
                }

                let response = request
                    .send()
                    .await
                    .context("Failed to reach transcription provider")?;
                if !response.status().is_success() {
                    anyhow::bail!("Transcription provider returned {}", response.status());
                }
                response
                    .json()
                    .await
                    .context("Malformed transcription response")
            }
        })
        .await?;

        Ok(response.text)
    }
}

/// Culturally adapting translation over a JSON HTTP endpoint.
///
/// The endpoint must answer with `{"translation": "...", "adaptations":
/// [{original, adapted, reason, position}, ...]}`.
pub struct HttpTranslationProvider {
    client: Client,
    endpoint: ProviderEndpoint,
    retries: u32,
    backoff: Duration,
}

impl HttpTranslationProvider {
    pub fn new(endpoint: ProviderEndpoint, policy: &AdapterPolicy) -> Self {
        Self {
            client: build_client(policy.timeout()),
            endpoint,
            retries: policy.retries,
            backoff: policy.backoff(),
        }
    }
}

#[async_trait]
impl TranslationProvider for HttpTranslationProvider {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> anyhow::Result<TranslationResult> {
        let body = json!({
            "model": self.endpoint.model,
            "text": text,
            "source_language": source,
            "target_language": target,
        });

        with_retries(self.retries, self.backoff, || {
            let client = self.client.clone();
            let url = self.endpoint.url.clone();
            let api_key = self.endpoint.api_key.clone();
            let body = body.clone();
            async move {
                let response = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .json(&body)
                    .send()
                    .await
                    .context("Failed to reach translation provider")?;
                if !response.status().is_success() {
                    anyhow::bail!("Translation provider returned {}", response.status());
                }
                response.json().await.context("Malformed translation response")
            }
        })
        .await
    }
}

/// Speech synthesis over a JSON-in/bytes-out HTTP endpoint.
pub struct HttpSpeechProvider {
    client: Client,
    endpoint: ProviderEndpoint,
    retries: u32,
    backoff: Duration,
}

impl HttpSpeechProvider {
    pub fn new(endpoint: ProviderEndpoint, policy: &AdapterPolicy) -> Self {
        Self {
            client: build_client(policy.timeout()),
            endpoint,
            retries: policy.retries,
            backoff: policy.backoff(),
        }
    }
}

#[async_trait]
impl SpeechProvider for HttpSpeechProvider {
    async fn synthesize(&self, text: &str, voice_id: &str) -> anyhow::Result<Bytes> {
        let body = json!({
            "model": self.endpoint.model,
            "text": text,
            "voice_id": voice_id,
        });

        with_retries(self.retries, self.backoff, || {
            let client = self.client.clone();
            let url = self.endpoint.url.clone();
            let api_key = self.endpoint.api_key.clone();
            let body = body.clone();
            async move {
                let response = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .json(&body)
                    .send()
                    .await
                    .context("Failed to reach speech provider")?;
                if !response.status().is_success() {
                    anyhow::bail!("Speech provider returned {}", response.status());
                }
                response.bytes().await.context("Failed to read synthesized audio")
            }
        })
        .await
    }
}
