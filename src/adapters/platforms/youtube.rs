//! YouTube metadata publisher.
//!
//! Registers the episode as a public video entry; the media itself stays
//! behind the canonical episode link.

use anyhow::Context;
use async_trait::async_trait;
use crosscast_common::Platform;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::adapters::{with_retries, EpisodePost, PublishProvider};
use crate::config::AdapterPolicy;

pub struct YoutubePublisher {
    client: Client,
    api_url: String,
    access_token: String,
    category_id: String,
    retries: u32,
    backoff: Duration,
}

impl YoutubePublisher {
    pub fn new(api_url: &str, access_token: &str, category_id: &str, policy: &AdapterPolicy) -> Self {
        Self {
            client: Client::builder()
                .timeout(policy.timeout())
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            category_id: category_id.to_string(),
            retries: policy.retries,
            backoff: policy.backoff(),
        }
    }
}

#[derive(Deserialize)]
struct VideoInsertResponse {
    id: String,
}

#[async_trait]
impl PublishProvider for YoutubePublisher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn publish(&self, post: &EpisodePost) -> anyhow::Result<Option<String>> {
        let body = json!({
            "snippet": {
                "title": post.title,
                "description": format!("{}\n\nListen: {}", post.description, post.episode_url),
                "categoryId": self.category_id,
                "defaultLanguage": post.language,
            },
            "status": { "privacyStatus": "public" }
        });

        let response: VideoInsertResponse = with_retries(self.retries, self.backoff, || {
            let client = self.client.clone();
            let url = format!("{}/youtube/v3/videos?part=snippet,status", self.api_url);
            let token = self.access_token.clone();
            let body = body.clone();
            async move {
                let response = client
                    .post(&url)
                    .bearer_auth(&token)
                    .json(&body)
                    .send()
                    .await
                    .context("Failed to reach YouTube")?;
                if !response.status().is_success() {
                    anyhow::bail!("YouTube returned {}", response.status());
                }
                response.json().await.context("Malformed YouTube response")
            }
        })
        .await?;

        Ok(Some(format!("https://www.youtube.com/watch?v={}", response.id)))
    }
}
