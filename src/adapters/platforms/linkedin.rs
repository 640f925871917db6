//! LinkedIn UGC post publisher.

use anyhow::Context;
use async_trait::async_trait;
use crosscast_common::Platform;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::adapters::{with_retries, EpisodePost, PublishProvider};
use crate::config::AdapterPolicy;

pub struct LinkedinPublisher {
    client: Client,
    api_url: String,
    access_token: String,
    author_urn: String,
    retries: u32,
    backoff: Duration,
}

impl LinkedinPublisher {
    pub fn new(api_url: &str, access_token: &str, author_id: &str, policy: &AdapterPolicy) -> Self {
        Self {
            client: Client::builder()
                .timeout(policy.timeout())
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            author_urn: format!("urn:li:person:{}", author_id),
            retries: policy.retries,
            backoff: policy.backoff(),
        }
    }
}

#[derive(Deserialize)]
struct UgcPostResponse {
    id: String,
}

#[async_trait]
impl PublishProvider for LinkedinPublisher {
    fn platform(&self) -> Platform {
        Platform::Linkedin
    }

    async fn publish(&self, post: &EpisodePost) -> anyhow::Result<Option<String>> {
        let text = format!(
            "🎙️ New episode: {}\n\n{}\n\nListen: {}",
            post.title, post.description, post.episode_url
        );
        let body = json!({
            "author": self.author_urn,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": text },
                    "shareMediaCategory": "NONE",
                    "media": [],
                }
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
            }
        });

        let response: UgcPostResponse = with_retries(self.retries, self.backoff, || {
            let client = self.client.clone();
            let url = format!("{}/v2/ugcPosts", self.api_url);
            let token = self.access_token.clone();
            let body = body.clone();
            async move {
                let response = client
                    .post(&url)
                    .bearer_auth(&token)
                    .header("X-Restli-Protocol-Version", "2.0.0")
                    .json(&body)
                    .send()
                    .await
                    .context("Failed to reach LinkedIn")?;
                if !response.status().is_success() {
                    anyhow::bail!("LinkedIn returned {}", response.status());
                }
                response.json().await.context("Malformed LinkedIn response")
            }
        })
        .await?;

        Ok(Some(format!(
            "https://www.linkedin.com/feed/update/{}",
            response.id
        )))
    }
}
