//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires an in-memory database, fake
//! adapters with configurable failures, and a full [`AppContext`]. The
//! [`TestHarness::with_server`] constructor starts Axum on a random port
//! for HTTP-level testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use crosscast::adapters::{
    Adapters, EpisodePost, MediaStore, PublishProvider, SpeechProvider, TranscriptionProvider,
    TranslationProvider, TranslationResult,
};
use crosscast::config::Config;
use crosscast::pipeline::{PipelineOrchestrator, RunOutcome};
use crosscast::server::{create_router, AppContext};
use crosscast_common::{Adaptation, EpisodeId, Language, Platform};
use crosscast_db::models::{Distribution, Episode, StepRecord};
use crosscast_db::pool::{init_memory_pool, DbPool, PooledConnection};
use crosscast_db::queries::{distributions, episodes, steps};

// ---------------------------------------------------------------------------
// Fake adapters
// ---------------------------------------------------------------------------

pub struct FakeTranscription {
    pub text: String,
    pub fail: bool,
}

#[async_trait]
impl TranscriptionProvider for FakeTranscription {
    async fn transcribe(&self, _audio: Bytes, _language: Language) -> anyhow::Result<String> {
        if self.fail {
            anyhow::bail!("transcription provider unavailable");
        }
        Ok(self.text.clone())
    }
}

pub struct FakeTranslation {
    pub translation: String,
    pub adaptations: Vec<Adaptation>,
    pub fail: bool,
}

#[async_trait]
impl TranslationProvider for FakeTranslation {
    async fn translate(
        &self,
        _text: &str,
        _source: Language,
        _target: Language,
    ) -> anyhow::Result<TranslationResult> {
        if self.fail {
            anyhow::bail!("translation provider unavailable");
        }
        Ok(TranslationResult {
            translation: self.translation.clone(),
            adaptations: self.adaptations.clone(),
        })
    }
}

pub struct FakeSpeech {
    pub fail: bool,
}

#[async_trait]
impl SpeechProvider for FakeSpeech {
    async fn synthesize(&self, _text: &str, _voice_id: &str) -> anyhow::Result<Bytes> {
        if self.fail {
            anyhow::bail!("speech provider unavailable");
        }
        Ok(Bytes::from_static(b"generated-audio"))
    }
}

pub struct FakeMediaStore {
    pub stored: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn fetch(&self, _url: &str) -> anyhow::Result<Bytes> {
        Ok(Bytes::from_static(b"source-media"))
    }

    async fn store_audio(
        &self,
        episode_id: EpisodeId,
        language: Language,
        _audio: Bytes,
    ) -> anyhow::Result<String> {
        let url = format!("mem://media/{}_{}.mp3", episode_id, language);
        self.stored.lock().unwrap().push(url.clone());
        Ok(url)
    }
}

/// Records every post it is asked to publish; optionally fails.
pub struct FakePublisher {
    platform: Platform,
    fail: bool,
    pub published: Arc<Mutex<Vec<EpisodePost>>>,
}

impl FakePublisher {
    pub fn new(platform: Platform, fail: bool) -> Self {
        Self {
            platform,
            fail,
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl PublishProvider for FakePublisher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn publish(&self, post: &EpisodePost) -> anyhow::Result<Option<String>> {
        if self.fail {
            anyhow::bail!("{} rejected the publish", self.platform);
        }
        self.published.lock().unwrap().push(post.clone());
        Ok(Some(format!("https://{}.example/posts/1", self.platform)))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Which fakes should fail, and what the healthy ones return.
pub struct HarnessOptions {
    pub transcript: String,
    pub translation: String,
    pub adaptations: Vec<Adaptation>,
    pub transcription_fails: bool,
    pub translation_fails: bool,
    pub speech_fails: bool,
    /// Platforms to publish to, with a per-platform failure flag.
    pub platforms: Vec<(Platform, bool)>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            transcript: "piece of cake".into(),
            translation: "pan comido".into(),
            adaptations: vec![Adaptation {
                original: "piece of cake".into(),
                adapted: "pan comido".into(),
                reason: "idiom".into(),
                position: 0,
            }],
            transcription_fails: false,
            translation_fails: false,
            speech_fails: false,
            platforms: vec![(Platform::Discord, false), (Platform::Email, false)],
        }
    }
}

pub struct TestHarness {
    pub ctx: AppContext,
    pub pool: DbPool,
    pub publishers: Vec<Arc<FakePublisher>>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_options(HarnessOptions::default())
    }

    pub fn with_options(options: HarnessOptions) -> Self {
        let pool = init_memory_pool().expect("failed to create in-memory pool");

        let publishers: Vec<Arc<FakePublisher>> = options
            .platforms
            .iter()
            .map(|(platform, fail)| Arc::new(FakePublisher::new(*platform, *fail)))
            .collect();

        let adapters = Adapters {
            transcription: Arc::new(FakeTranscription {
                text: options.transcript,
                fail: options.transcription_fails,
            }),
            translation: Arc::new(FakeTranslation {
                translation: options.translation,
                adaptations: options.adaptations,
                fail: options.translation_fails,
            }),
            speech: Arc::new(FakeSpeech {
                fail: options.speech_fails,
            }),
            media: Arc::new(FakeMediaStore {
                stored: Mutex::new(Vec::new()),
            }),
            publishers: publishers
                .iter()
                .map(|p| p.clone() as Arc<dyn PublishProvider>)
                .collect(),
        };

        // Zero tick delay keeps the cosmetic ingest stage instant in tests.
        let mut config = Config::default();
        config.ingest.tick_ms = 0;
        config.app.public_url = "https://pods.example".into();

        let ctx = AppContext::with_adapters(config, pool.clone(), adapters);

        Self {
            ctx,
            pool,
            publishers,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_options(HarnessOptions::default()).await
    }

    pub async fn with_server_options(options: HarnessOptions) -> (Self, SocketAddr) {
        let harness = Self::with_options(options);
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        crosscast_db::pool::get_conn(&self.pool).expect("failed to get db connection")
    }

    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.ctx.orchestrator
    }

    /// Register an episode directly in the store.
    pub fn create_episode(&self, title: &str, source: Language, target: Language) -> Episode {
        let conn = self.conn();
        episodes::create_episode(
            &conn,
            &crosscast_db::queries::episodes::NewEpisode {
                title: title.into(),
                description: "Test episode".into(),
                source_language: source,
                target_language: target,
                media_url: "mem://episodes/source.mp3".into(),
                file_size: 2048,
            },
        )
        .expect("failed to create episode")
    }

    /// Run the full pipeline for an episode.
    pub async fn run(&self, episode_id: EpisodeId) -> RunOutcome {
        self.ctx
            .orchestrator
            .run(episode_id)
            .await
            .expect("pipeline run errored")
    }

    pub fn episode(&self, episode_id: EpisodeId) -> Episode {
        let conn = self.conn();
        episodes::get_episode(&conn, episode_id)
            .expect("failed to fetch episode")
            .expect("episode missing")
    }

    pub fn steps(&self, episode_id: EpisodeId) -> BTreeMap<String, StepRecord> {
        let conn = self.conn();
        steps::list_steps(&conn, episode_id)
            .expect("failed to list steps")
            .into_iter()
            .map(|s| (s.step_id.to_string(), s))
            .collect()
    }

    pub fn outcomes(&self, episode_id: EpisodeId) -> Vec<Distribution> {
        let conn = self.conn();
        distributions::list_outcomes(&conn, episode_id).expect("failed to list outcomes")
    }
}
