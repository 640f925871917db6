//! Pipeline orchestrator: the core state machine.
//!
//! Runs the fixed stage sequence for one episode, updating the step ledger
//! and the episode record before, during, and after each stage. Failure
//! policy per stage:
//!
//! - transcribe / translate (and the media fetch feeding them): **fatal** —
//!   the stage records `error`, the remaining sequence is skipped, and the
//!   episode ends `failed`.
//! - voice: **degraded** — the error is recorded on the stage, the stage is
//!   still marked `completed`, and the run continues without an audio
//!   artifact.
//! - distribute: **per-target** — each platform's failure is recorded in its
//!   own outcome row and never affects other platforms or the stage.
//!
//! Database connections are checked out for short synchronous spans and
//! dropped before any await.

use crosscast_common::{EpisodeId, EpisodeStatus, Error, Result, Stage, StepStatus};
use crosscast_db::models::Episode;
use crosscast_db::pool::{get_conn, DbPool};
use crosscast_db::queries::{distributions, episodes};

use crate::adapters::{Adapters, EpisodePost};
use crate::config::{Config, IngestConfig};
use crate::events::{EventBus, PipelineEvent};
use crate::pipeline::StepLedger;

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
}

pub struct PipelineOrchestrator {
    pool: DbPool,
    ledger: StepLedger,
    adapters: Adapters,
    events: EventBus,
    public_url: String,
    voice_id: String,
    ingest: IngestConfig,
}

impl PipelineOrchestrator {
    pub fn new(pool: DbPool, adapters: Adapters, events: EventBus, config: &Config) -> Self {
        Self {
            ledger: StepLedger::new(pool.clone()),
            pool,
            adapters,
            events,
            public_url: config.app.public_url.trim_end_matches('/').to_string(),
            voice_id: config.app.voice_id.clone(),
            ingest: config.ingest.clone(),
        }
    }

    /// Run the full stage sequence for an episode.
    ///
    /// Returns `Err` only when the episode is unknown or the store itself
    /// fails while recording the terminal state; a fatal *stage* error is
    /// absorbed here into `RunOutcome::Failed` after marking the episode.
    pub async fn run(&self, episode_id: EpisodeId) -> Result<RunOutcome> {
        let episode = {
            let conn = get_conn(&self.pool)?;
            episodes::get_episode(&conn, episode_id)?.ok_or_else(|| Error::not_found("episode"))?
        };

        tracing::info!(episode_id = %episode_id, title = %episode.title, "Starting localization pipeline");

        match self.execute(&episode).await {
            Ok(()) => {
                tracing::info!(episode_id = %episode_id, "Pipeline completed");
                Ok(RunOutcome::Completed)
            }
            Err(e) => {
                tracing::error!(episode_id = %episode_id, error = %e, "Pipeline failed");
                {
                    let conn = get_conn(&self.pool)?;
                    episodes::set_status(&conn, episode_id, EpisodeStatus::Failed)?;
                }
                self.events.broadcast(PipelineEvent::EpisodeFailed {
                    episode_id,
                    error: e.to_string(),
                });
                Ok(RunOutcome::Failed)
            }
        }
    }

    async fn execute(&self, episode: &Episode) -> anyhow::Result<()> {
        self.acknowledge_ingest(episode.id).await?;
        let transcript = self.transcribe(episode).await?;
        let translation = self.translate(episode, &transcript).await?;
        self.synthesize_voice(episode, &translation).await?;
        self.format(episode.id)?;
        self.distribute(episode).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage protocol helpers
    // ------------------------------------------------------------------

    fn begin_step(&self, episode_id: EpisodeId, stage: Stage, message: &str) -> Result<()> {
        self.ledger
            .upsert(episode_id, stage, StepStatus::Active, Some(0), None)?;
        self.ledger.append_log(episode_id, stage, message)?;
        self.events.broadcast(PipelineEvent::StepStarted {
            episode_id,
            step: stage,
        });
        Ok(())
    }

    fn complete_step(&self, episode_id: EpisodeId, stage: Stage, message: &str) -> Result<()> {
        self.ledger
            .upsert(episode_id, stage, StepStatus::Completed, Some(100), None)?;
        self.ledger.append_log(episode_id, stage, message)?;
        self.events.broadcast(PipelineEvent::StepCompleted {
            episode_id,
            step: stage,
        });
        Ok(())
    }

    fn fail_step(&self, episode_id: EpisodeId, stage: Stage, error: &str) -> Result<()> {
        self.ledger
            .upsert(episode_id, stage, StepStatus::Error, None, Some(error))?;
        self.events.broadcast(PipelineEvent::StepFailed {
            episode_id,
            step: stage,
            error: error.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage 1: ingest acknowledgment
    // ------------------------------------------------------------------

    /// Walk the upload stage from 0 to 100 in fixed ticks. Cosmetic; the
    /// upload itself happened before the episode was registered.
    async fn acknowledge_ingest(&self, episode_id: EpisodeId) -> anyhow::Result<()> {
        let stage = Stage::Ingest;
        self.begin_step(episode_id, stage, "Acknowledging uploaded media")?;

        let step = self.ingest.step_percent.clamp(1, 100) as i32;
        let mut progress = 0;
        while progress < 100 {
            progress = (progress + step).min(100);
            self.ledger
                .upsert(episode_id, stage, StepStatus::Active, Some(progress), None)?;
            self.events.broadcast(PipelineEvent::StepProgress {
                episode_id,
                step: stage,
                progress,
            });
            if !self.ingest.tick().is_zero() {
                tokio::time::sleep(self.ingest.tick()).await;
            }
        }

        self.complete_step(episode_id, stage, "Source media received")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage 2: transcribe (fatal)
    // ------------------------------------------------------------------

    async fn transcribe(&self, episode: &Episode) -> anyhow::Result<String> {
        let stage = Stage::Transcribe;
        self.begin_step(episode.id, stage, "Starting transcription")?;

        let result = async {
            let audio = self.adapters.media.fetch(&episode.media_url).await?;
            self.adapters
                .transcription
                .transcribe(audio, episode.source_language)
                .await
        }
        .await;

        match result {
            Ok(text) => {
                {
                    let conn = get_conn(&self.pool)?;
                    episodes::save_transcript(&conn, episode.id, &text)?;
                }
                self.complete_step(
                    episode.id,
                    stage,
                    &format!("Transcribed {} characters", text.chars().count()),
                )?;
                Ok(text)
            }
            Err(e) => {
                self.fail_step(episode.id, stage, &e.to_string())?;
                Err(e.context("Transcription failed"))
            }
        }
    }

    // ------------------------------------------------------------------
    // Stage 3: translate (fatal)
    // ------------------------------------------------------------------

    async fn translate(&self, episode: &Episode, transcript: &str) -> anyhow::Result<String> {
        let stage = Stage::Translate;
        self.begin_step(episode.id, stage, "Starting cultural adaptation")?;

        match self
            .adapters
            .translation
            .translate(transcript, episode.source_language, episode.target_language)
            .await
        {
            Ok(result) => {
                {
                    let conn = get_conn(&self.pool)?;
                    episodes::save_translation(
                        &conn,
                        episode.id,
                        &result.translation,
                        &result.adaptations,
                    )?;
                }
                self.complete_step(
                    episode.id,
                    stage,
                    &format!("Applied {} cultural adaptations", result.adaptations.len()),
                )?;
                Ok(result.translation)
            }
            Err(e) => {
                self.fail_step(episode.id, stage, &e.to_string())?;
                Err(e.context("Translation failed"))
            }
        }
    }

    // ------------------------------------------------------------------
    // Stage 4: synthesize voice (degraded on failure)
    // ------------------------------------------------------------------

    async fn synthesize_voice(&self, episode: &Episode, text: &str) -> anyhow::Result<()> {
        let stage = Stage::Voice;
        self.begin_step(episode.id, stage, "Generating target-language audio")?;

        let result = async {
            let audio = self.adapters.speech.synthesize(text, &self.voice_id).await?;
            self.adapters
                .media
                .store_audio(episode.id, episode.target_language, audio)
                .await
        }
        .await;

        match result {
            Ok(audio_url) => {
                {
                    let conn = get_conn(&self.pool)?;
                    episodes::save_audio(&conn, episode.id, &audio_url, &self.voice_id)?;
                }
                self.complete_step(episode.id, stage, "Generated localized audio")?;
            }
            Err(e) => {
                // Voice synthesis is an enhancement, not a gate for
                // publishing: record the error, mark the stage completed,
                // and continue without an audio artifact.
                tracing::warn!(episode_id = %episode.id, error = %e, "Voice synthesis failed, continuing");
                self.fail_step(episode.id, stage, &e.to_string())?;
                self.complete_step(episode.id, stage, "Continuing without generated audio")?;
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage 5: format (bookkeeping)
    // ------------------------------------------------------------------

    fn format(&self, episode_id: EpisodeId) -> Result<()> {
        let stage = Stage::Format;
        self.begin_step(episode_id, stage, "Preparing content for each platform")?;
        self.complete_step(episode_id, stage, "All formats prepared")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage 6: distribute (per-target isolation)
    // ------------------------------------------------------------------

    async fn distribute(&self, episode: &Episode) -> anyhow::Result<()> {
        let stage = Stage::Distribute;
        self.begin_step(episode.id, stage, "Starting multi-platform distribution")?;

        let post = EpisodePost {
            title: episode.title.clone(),
            description: episode.description.clone(),
            episode_url: format!("{}/episodes/{}", self.public_url, episode.id),
            language: episode.target_language,
        };

        // Publish to every platform concurrently; each result is recorded
        // independently, so one slow or failing platform cannot affect
        // another's outcome.
        let attempts = self.adapters.publishers.iter().map(|publisher| {
            let post = post.clone();
            async move { (publisher.platform(), publisher.publish(&post).await) }
        });
        let results = futures::future::join_all(attempts).await;

        let platform_count = results.len();
        {
            let conn = get_conn(&self.pool)?;
            for (platform, result) in results {
                match result {
                    Ok(url) => {
                        distributions::record_published(&conn, episode.id, platform, url.as_deref())?;
                    }
                    Err(e) => {
                        tracing::warn!(episode_id = %episode.id, platform = %platform, error = %e, "Publish failed");
                        distributions::record_failed(&conn, episode.id, platform, &e.to_string())?;
                    }
                }
            }
        }

        self.complete_step(
            episode.id,
            stage,
            &format!("Published to {} platforms", platform_count),
        )?;

        {
            let conn = get_conn(&self.pool)?;
            episodes::set_status(&conn, episode.id, EpisodeStatus::Completed)?;
        }
        self.events.broadcast(PipelineEvent::EpisodeCompleted {
            episode_id: episode.id,
        });

        Ok(())
    }
}
