//! Per-platform publish adapters.
//!
//! Each publisher wraps one external platform behind [`PublishProvider`]
//! and is constructed from its config entry; disabled targets are skipped.

mod discord;
mod email;
mod linkedin;
mod youtube;

pub use discord::DiscordPublisher;
pub use email::{episode_email_html, EmailPublisher};
pub use linkedin::LinkedinPublisher;
pub use youtube::YoutubePublisher;

use std::sync::Arc;

use super::PublishProvider;
use crate::config::{AdapterPolicy, PlatformKind, PlatformTarget};

/// Build publishers for all enabled platform targets.
pub fn create_publishers(
    targets: &[PlatformTarget],
    policy: &AdapterPolicy,
) -> Vec<Arc<dyn PublishProvider>> {
    targets
        .iter()
        .filter(|t| t.enabled)
        .map(|t| match &t.kind {
            PlatformKind::Discord { webhook_url } => {
                Arc::new(DiscordPublisher::new(webhook_url, policy)) as Arc<dyn PublishProvider>
            }
            PlatformKind::Email {
                api_url,
                api_key,
                from,
                to,
            } => Arc::new(EmailPublisher::new(api_url, api_key, from, to.clone(), policy)),
            PlatformKind::Linkedin {
                api_url,
                access_token,
                author_id,
            } => Arc::new(LinkedinPublisher::new(api_url, access_token, author_id, policy)),
            PlatformKind::Youtube {
                api_url,
                access_token,
                category_id,
            } => Arc::new(YoutubePublisher::new(api_url, access_token, category_id, policy)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosscast_common::Platform;

    #[test]
    fn test_create_publishers_skips_disabled() {
        let targets = vec![
            PlatformTarget {
                enabled: true,
                kind: PlatformKind::Discord {
                    webhook_url: "https://discord.example/webhook".into(),
                },
            },
            PlatformTarget {
                enabled: false,
                kind: PlatformKind::Youtube {
                    api_url: "https://www.googleapis.com".into(),
                    access_token: "tok".into(),
                    category_id: "22".into(),
                },
            },
        ];

        let publishers = create_publishers(&targets, &AdapterPolicy::default());
        assert_eq!(publishers.len(), 1);
        assert_eq!(publishers[0].platform(), Platform::Discord);
    }
}
