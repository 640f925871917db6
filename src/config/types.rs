use crosscast_common::Platform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub adapters: AdapterPolicy,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub platforms: Vec<PlatformTarget>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Public base URL used to build canonical episode links.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Directory holding the database and generated media files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Voice identifier passed to the speech-synthesis provider.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_voice_id() -> String {
    "default".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
            data_dir: default_data_dir(),
            voice_id: default_voice_id(),
        }
    }
}

/// Endpoint + credentials for one AI provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderEndpoint {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub transcription: ProviderEndpoint,

    #[serde(default)]
    pub translation: ProviderEndpoint,

    #[serde(default)]
    pub speech: ProviderEndpoint,
}

/// Timeout and retry policy applied to every adapter call.
///
/// The orchestrator passes this through at adapter construction; it never
/// hard-codes timing itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdapterPolicy {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional attempts after the first failure.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Initial backoff between attempts; doubles per retry.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}

impl AdapterPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for AdapterPolicy {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Pacing of the cosmetic ingest-acknowledgment progress ticks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Percentage added per tick.
    #[serde(default = "default_step_percent")]
    pub step_percent: u32,

    /// Delay between ticks in milliseconds; zero disables the pacing.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_step_percent() -> u32 {
    20
}
fn default_tick_ms() -> u64 {
    100
}

impl IngestConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            step_percent: default_step_percent(),
            tick_ms: default_tick_ms(),
        }
    }
}

/// One configured distribution target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformTarget {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(flatten)]
    pub kind: PlatformKind,
}

fn default_enabled() -> bool {
    true
}

/// Per-platform connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PlatformKind {
    Discord {
        webhook_url: String,
    },
    Email {
        #[serde(default = "default_email_api_url")]
        api_url: String,
        api_key: String,
        #[serde(default = "default_email_from")]
        from: String,
        to: Vec<String>,
    },
    Linkedin {
        #[serde(default = "default_linkedin_api_url")]
        api_url: String,
        access_token: String,
        /// LinkedIn member id; expanded to `urn:li:person:{id}`.
        author_id: String,
    },
    Youtube {
        #[serde(default = "default_youtube_api_url")]
        api_url: String,
        access_token: String,
        #[serde(default = "default_youtube_category")]
        category_id: String,
    },
}

fn default_email_api_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_email_from() -> String {
    "noreply@crosscast.example".to_string()
}
fn default_linkedin_api_url() -> String {
    "https://api.linkedin.com".to_string()
}
fn default_youtube_api_url() -> String {
    "https://www.googleapis.com".to_string()
}
fn default_youtube_category() -> String {
    // People & Blogs
    "22".to_string()
}

impl PlatformKind {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Discord { .. } => Platform::Discord,
            Self::Email { .. } => Platform::Email,
            Self::Linkedin { .. } => Platform::Linkedin,
            Self::Youtube { .. } => Platform::Youtube,
        }
    }
}
