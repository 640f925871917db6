//! Platform publisher tests against a mock HTTP server.

use crosscast::adapters::platforms::{DiscordPublisher, EmailPublisher, LinkedinPublisher};
use crosscast::adapters::{EpisodePost, PublishProvider};
use crosscast::config::AdapterPolicy;
use crosscast_common::{Language, Platform};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_policy() -> AdapterPolicy {
    AdapterPolicy {
        timeout_secs: 5,
        retries: 0,
        retry_backoff_ms: 0,
    }
}

fn sample_post() -> EpisodePost {
    EpisodePost {
        title: "Episode 1".into(),
        description: "Pilot".into(),
        episode_url: "https://pods.example/episodes/1".into(),
        language: Language::Es,
    }
}

#[tokio::test]
async fn discord_publisher_sends_webhook_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_partial_json(serde_json::json!({
            "content": "🎙️ **New Episode Published!**",
            "embeds": [{ "title": "Episode 1", "url": "https://pods.example/episodes/1" }],
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = DiscordPublisher::new(&format!("{}/webhook", server.uri()), &test_policy());

    assert_eq!(publisher.platform(), Platform::Discord);
    let url = publisher.publish(&sample_post()).await.unwrap();
    assert!(url.is_none());
}

#[tokio::test]
async fn discord_publisher_maps_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let publisher = DiscordPublisher::new(&format!("{}/webhook", server.uri()), &test_policy());

    let err = publisher.publish(&sample_post()).await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn discord_publisher_retries_transient_failures() {
    let server = MockServer::start().await;

    // First attempt fails, the bounded retry succeeds.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let policy = AdapterPolicy {
        timeout_secs: 5,
        retries: 1,
        retry_backoff_ms: 0,
    };
    let publisher = DiscordPublisher::new(&format!("{}/webhook", server.uri()), &policy);

    publisher.publish(&sample_post()).await.unwrap();
}

#[tokio::test]
async fn email_publisher_sends_templated_announcement() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test"))
        .and(body_partial_json(serde_json::json!({
            "from": "noreply@pods.example",
            "to": ["list@pods.example"],
            "subject": "New Episode: Episode 1",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = EmailPublisher::new(
        &server.uri(),
        "re_test",
        "noreply@pods.example",
        vec!["list@pods.example".into()],
        &test_policy(),
    );

    assert_eq!(publisher.platform(), Platform::Email);
    publisher.publish(&sample_post()).await.unwrap();
}

#[tokio::test]
async fn linkedin_publisher_returns_post_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(header("x-restli-protocol-version", "2.0.0"))
        .and(body_partial_json(serde_json::json!({
            "author": "urn:li:person:abc123",
            "lifecycleState": "PUBLISHED",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "urn:li:ugcPost:42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = LinkedinPublisher::new(&server.uri(), "token", "abc123", &test_policy());

    let url = publisher.publish(&sample_post()).await.unwrap();
    assert_eq!(
        url.as_deref(),
        Some("https://www.linkedin.com/feed/update/urn:li:ugcPost:42")
    );
}
