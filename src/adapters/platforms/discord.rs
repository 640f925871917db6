//! Discord webhook publisher.

use anyhow::Context;
use async_trait::async_trait;
use crosscast_common::Platform;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::adapters::{with_retries, EpisodePost, PublishProvider};
use crate::config::AdapterPolicy;

const EMBED_COLOR_BLUE: u32 = 0x3b82f6;

#[derive(Debug, Clone, Serialize)]
struct DiscordMessage {
    content: String,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Clone, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    url: String,
    color: u32,
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedFooter {
    text: String,
}

fn episode_message(post: &EpisodePost) -> DiscordMessage {
    DiscordMessage {
        content: "🎙️ **New Episode Published!**".to_string(),
        embeds: vec![DiscordEmbed {
            title: post.title.clone(),
            description: post.description.clone(),
            url: post.episode_url.clone(),
            color: EMBED_COLOR_BLUE,
            fields: vec![EmbedField {
                name: "🎧 Listen Now".to_string(),
                value: post.episode_url.clone(),
                inline: false,
            }],
            footer: EmbedFooter {
                text: "Crosscast".to_string(),
            },
        }],
    }
}

pub struct DiscordPublisher {
    client: Client,
    webhook_url: String,
    retries: u32,
    backoff: Duration,
}

impl DiscordPublisher {
    pub fn new(webhook_url: &str, policy: &AdapterPolicy) -> Self {
        Self {
            client: Client::builder()
                .timeout(policy.timeout())
                .build()
                .unwrap_or_else(|_| Client::new()),
            webhook_url: webhook_url.to_string(),
            retries: policy.retries,
            backoff: policy.backoff(),
        }
    }
}

#[async_trait]
impl PublishProvider for DiscordPublisher {
    fn platform(&self) -> Platform {
        Platform::Discord
    }

    async fn publish(&self, post: &EpisodePost) -> anyhow::Result<Option<String>> {
        let message = episode_message(post);

        with_retries(self.retries, self.backoff, || {
            let client = self.client.clone();
            let url = self.webhook_url.clone();
            let message = message.clone();
            async move {
                let response = client
                    .post(&url)
                    .json(&message)
                    .send()
                    .await
                    .context("Failed to send Discord webhook")?;
                if !response.status().is_success() {
                    anyhow::bail!("Discord webhook returned {}", response.status());
                }
                Ok(())
            }
        })
        .await?;

        // Webhook responses carry no message URL
        Ok(None)
    }
}
