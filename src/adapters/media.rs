//! Media storage adapter.
//!
//! Fetches uploaded source media (HTTP or local path) and stores generated
//! audio under the data directory, where the server exposes it at
//! `/media/...`.

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use crosscast_common::{EpisodeId, Language};
use reqwest::Client;
use std::path::PathBuf;

use super::MediaStore;
use crate::config::Config;

pub struct LocalMediaStore {
    client: Client,
    media_dir: PathBuf,
    public_url: String,
}

impl LocalMediaStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.adapters.timeout())
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                    Client::new()
                }),
            media_dir: config.app.data_dir.join("media"),
            public_url: config.app.public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Directory where generated audio files are written.
    pub fn media_dir(&self) -> &PathBuf {
        &self.media_dir
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn fetch(&self, url: &str) -> anyhow::Result<Bytes> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("Failed to fetch source media from {}", url))?;
            if !response.status().is_success() {
                anyhow::bail!("Media fetch returned {}", response.status());
            }
            response.bytes().await.context("Failed to read source media body")
        } else {
            let data = tokio::fs::read(url)
                .await
                .with_context(|| format!("Failed to read media file {}", url))?;
            Ok(Bytes::from(data))
        }
    }

    async fn store_audio(
        &self,
        episode_id: EpisodeId,
        language: Language,
        audio: Bytes,
    ) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.media_dir)
            .await
            .with_context(|| format!("Failed to create media dir {:?}", self.media_dir))?;

        let file_name = format!("{}_{}.mp3", episode_id, language);
        let path = self.media_dir.join(&file_name);
        tokio::fs::write(&path, &audio)
            .await
            .with_context(|| format!("Failed to write generated audio to {:?}", path))?;

        Ok(format!("{}/media/{}", self.public_url, file_name))
    }
}
