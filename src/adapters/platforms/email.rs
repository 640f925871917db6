//! Subscriber email publisher (Resend-style HTTP API).

use anyhow::Context;
use async_trait::async_trait;
use crosscast_common::{Language, Platform};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::adapters::{with_retries, EpisodePost, PublishProvider};
use crate::config::AdapterPolicy;

/// Render the listener-facing episode announcement email.
pub fn episode_email_html(
    title: &str,
    description: &str,
    episode_url: &str,
    language: Language,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <style>
      body {{ font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif;
              line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
      .header {{ background: linear-gradient(135deg, #3B82F6 0%, #8B5CF6 100%);
                 color: white; padding: 30px; border-radius: 10px; text-align: center; }}
      .cta-button {{ display: inline-block; background: #3B82F6; color: white;
                     padding: 15px 30px; text-decoration: none; border-radius: 8px;
                     font-weight: bold; margin: 20px 0; }}
      .footer {{ border-top: 1px solid #e5e7eb; padding-top: 20px; margin-top: 40px;
                 font-size: 12px; color: #6b7280; text-align: center; }}
    </style>
  </head>
  <body>
    <div class="header"><h1>🎙️ New Episode Available!</h1></div>
    <div class="content">
      <h2>{title}</h2>
      <p>{description}</p>
      <p><strong>Language:</strong> {language}</p>
      <center><a href="{episode_url}" class="cta-button">🎧 Listen Now</a></center>
    </div>
    <div class="footer">
      <p>You're receiving this because you subscribed to our podcast.</p>
      <p>Powered by Crosscast</p>
    </div>
  </body>
</html>
"#,
        title = title,
        description = description,
        language = language.display_name(),
        episode_url = episode_url,
    )
}

#[derive(Debug, Clone, Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

pub struct EmailPublisher {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
    to: Vec<String>,
    retries: u32,
    backoff: Duration,
}

impl EmailPublisher {
    pub fn new(
        api_url: &str,
        api_key: &str,
        from: &str,
        to: Vec<String>,
        policy: &AdapterPolicy,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(policy.timeout())
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
            to,
            retries: policy.retries,
            backoff: policy.backoff(),
        }
    }
}

#[async_trait]
impl PublishProvider for EmailPublisher {
    fn platform(&self) -> Platform {
        Platform::Email
    }

    async fn publish(&self, post: &EpisodePost) -> anyhow::Result<Option<String>> {
        let request = SendEmailRequest {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: format!("New Episode: {}", post.title),
            html: episode_email_html(&post.title, &post.description, &post.episode_url, post.language),
        };

        with_retries(self.retries, self.backoff, || {
            let client = self.client.clone();
            let url = format!("{}/emails", self.api_url);
            let api_key = self.api_key.clone();
            let request = request.clone();
            async move {
                let response = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .json(&request)
                    .send()
                    .await
                    .context("Failed to reach email provider")?;
                if !response.status().is_success() {
                    anyhow::bail!("Email provider returned {}", response.status());
                }
                Ok(())
            }
        })
        .await?;

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_template_contains_episode_details() {
        let html = episode_email_html(
            "Episode 1",
            "The pilot episode",
            "https://pods.example/episodes/1",
            Language::Es,
        );

        assert!(html.contains("Episode 1"));
        assert!(html.contains("The pilot episode"));
        assert!(html.contains("https://pods.example/episodes/1"));
        assert!(html.contains("Spanish"));
    }
}
