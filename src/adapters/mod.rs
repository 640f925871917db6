//! Provider adapter traits and construction.
//!
//! Every external collaborator (speech-to-text, translation, speech
//! synthesis, media storage, and each distribution platform) is reached
//! through one of the traits below. The orchestrator depends only on the
//! trait objects, so tests substitute fakes and provider backends can be
//! swapped without touching pipeline logic.

pub mod media;
pub mod platforms;
pub mod providers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use crosscast_common::{Adaptation, EpisodeId, Language, Platform};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Translated text plus the cultural adaptations applied to it.
///
/// This is also the wire shape the translation provider must return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translation: String,
    #[serde(default)]
    pub adaptations: Vec<Adaptation>,
}

/// The publishable content of an episode, built once per distribution run.
#[derive(Debug, Clone)]
pub struct EpisodePost {
    pub title: String,
    pub description: String,
    /// Canonical public link to the episode.
    pub episode_url: String,
    pub language: Language,
}

/// Speech-to-text boundary.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe the given media bytes, hinting the source language.
    async fn transcribe(&self, audio: Bytes, language: Language) -> anyhow::Result<String>;
}

/// Culturally adapting translation boundary.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` from `source` to `target`, returning the adapted
    /// text and the list of adaptations made. A malformed provider
    /// response is an error.
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> anyhow::Result<TranslationResult>;
}

/// Speech-synthesis boundary.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize speech for `text` with the given voice, returning the
    /// audio buffer.
    async fn synthesize(&self, text: &str, voice_id: &str) -> anyhow::Result<Bytes>;
}

/// Per-platform publishing boundary.
#[async_trait]
pub trait PublishProvider: Send + Sync {
    /// The platform this publisher targets.
    fn platform(&self) -> Platform;

    /// Publish the episode post, returning the published URL when the
    /// platform reports one.
    async fn publish(&self, post: &EpisodePost) -> anyhow::Result<Option<String>>;
}

/// Media storage boundary: fetching uploaded source media and storing
/// generated audio.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Fetch the bytes behind a stored-media reference.
    async fn fetch(&self, url: &str) -> anyhow::Result<Bytes>;

    /// Store generated audio for an episode and return its public URL.
    async fn store_audio(
        &self,
        episode_id: EpisodeId,
        language: Language,
        audio: Bytes,
    ) -> anyhow::Result<String>;
}

/// The full set of adapters the orchestrator runs against.
#[derive(Clone)]
pub struct Adapters {
    pub transcription: Arc<dyn TranscriptionProvider>,
    pub translation: Arc<dyn TranslationProvider>,
    pub speech: Arc<dyn SpeechProvider>,
    pub media: Arc<dyn MediaStore>,
    pub publishers: Vec<Arc<dyn PublishProvider>>,
}

impl Adapters {
    /// Build the production adapter set from configuration.
    pub fn from_config(config: &Config) -> Self {
        let policy = &config.adapters;
        Self {
            transcription: Arc::new(providers::HttpTranscriptionProvider::new(
                config.providers.transcription.clone(),
                policy,
            )),
            translation: Arc::new(providers::HttpTranslationProvider::new(
                config.providers.translation.clone(),
                policy,
            )),
            speech: Arc::new(providers::HttpSpeechProvider::new(
                config.providers.speech.clone(),
                policy,
            )),
            media: Arc::new(media::LocalMediaStore::new(config)),
            publishers: platforms::create_publishers(&config.platforms, policy),
        }
    }
}

/// Run an adapter operation with bounded retries and doubling backoff.
///
/// `op` is re-invoked for each attempt, so it must clone whatever request
/// data the produced future needs.
pub(crate) async fn with_retries<T, Fut>(
    retries: u32,
    backoff: Duration,
    mut op: impl FnMut() -> Fut,
) -> anyhow::Result<T>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempt = 0;
    let mut delay = backoff;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::warn!("Adapter call failed (attempt {}): {}", attempt, e);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_with_retries_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retries(3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    anyhow::bail!("transient")
                }
                Ok(n)
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retries_gives_up() {
        let calls = AtomicU32::new(0);
        let result: anyhow::Result<()> = with_retries(1, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { anyhow::bail!("permanent") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
