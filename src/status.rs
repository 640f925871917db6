//! Status query service: read-only projection of job record + step ledger
//! + derived metrics for a polling client.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use crosscast_common::{EpisodeId, EpisodeStatus, Error, Result, StepStatus};
use crosscast_db::models::{Distribution, Episode, StepRecord};
use crosscast_db::pool::{get_conn, DbPool};
use crosscast_db::queries::{distributions, episodes, steps};
use serde::Serialize;

/// Per-stage view of the ledger as served to polling clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub status: StepStatus,
    pub progress: i32,
    pub logs: Vec<String>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<StepRecord> for StepView {
    fn from(record: StepRecord) -> Self {
        Self {
            status: record.status,
            progress: record.progress,
            logs: record.logs,
            error: record.error,
            started_at: record.started_at,
            completed_at: record.completed_at,
        }
    }
}

/// Derived reporting figures attached to every snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionMetrics {
    pub total_reach: u64,
    pub languages: u32,
    pub platforms: usize,
    pub time_saved_hours: u32,
}

/// Pluggable reporting hook; not correctness-critical.
pub trait MetricsProvider: Send + Sync {
    fn metrics(&self, episode: &Episode, outcomes: &[Distribution]) -> DistributionMetrics;
}

/// Default metrics: illustrative figures derived from the outcome list
/// rather than measured. Swap in a real provider for genuine analytics.
pub struct IllustrativeMetrics;

/// Assumed audience per successfully published platform.
const REACH_PER_PLATFORM: u64 = 5078;
/// Assumed manual effort avoided per localized episode.
const TIME_SAVED_HOURS: u32 = 12;

impl MetricsProvider for IllustrativeMetrics {
    fn metrics(&self, _episode: &Episode, outcomes: &[Distribution]) -> DistributionMetrics {
        let published = outcomes
            .iter()
            .filter(|o| o.status == crosscast_common::DistributionStatus::Published)
            .count() as u64;
        DistributionMetrics {
            total_reach: published * REACH_PER_PLATFORM,
            // Source + target of one localization run.
            languages: 2,
            platforms: outcomes.len(),
            time_saved_hours: TIME_SAVED_HOURS,
        }
    }
}

/// Snapshot served by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: EpisodeStatus,
    pub steps: BTreeMap<String, StepView>,
    pub metrics: DistributionMetrics,
    pub episode: Episode,
}

pub struct StatusService {
    pool: DbPool,
    metrics: Arc<dyn MetricsProvider>,
}

impl StatusService {
    pub fn new(pool: DbPool) -> Self {
        Self::with_metrics(pool, Arc::new(IllustrativeMetrics))
    }

    pub fn with_metrics(pool: DbPool, metrics: Arc<dyn MetricsProvider>) -> Self {
        Self { pool, metrics }
    }

    /// Assemble the full status snapshot for one episode.
    ///
    /// Fails with `Error::NotFound` when the episode id is unknown.
    pub fn snapshot(&self, episode_id: EpisodeId) -> Result<StatusSnapshot> {
        let conn = get_conn(&self.pool)?;

        let episode =
            episodes::get_episode(&conn, episode_id)?.ok_or_else(|| Error::not_found("episode"))?;

        let steps = steps::list_steps(&conn, episode_id)?
            .into_iter()
            .map(|s| (s.step_id.to_string(), StepView::from(s)))
            .collect();

        let outcomes = distributions::list_outcomes(&conn, episode_id)?;
        let metrics = self.metrics.metrics(&episode, &outcomes);

        Ok(StatusSnapshot {
            status: episode.status,
            steps,
            metrics,
            episode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosscast_common::{Language, Platform, Stage};
    use crosscast_db::pool::init_memory_pool;
    use crosscast_db::queries::episodes::NewEpisode;

    fn setup() -> (DbPool, EpisodeId) {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let episode = episodes::create_episode(
            &conn,
            &NewEpisode {
                title: "Episode 1".into(),
                description: String::new(),
                source_language: Language::En,
                target_language: Language::Es,
                media_url: "mem://ep1.mp3".into(),
                file_size: 0,
            },
        )
        .unwrap();
        drop(conn);
        (pool, episode.id)
    }

    #[test]
    fn test_snapshot_unknown_episode() {
        let (pool, _) = setup();
        let service = StatusService::new(pool);

        let err = service.snapshot(EpisodeId::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_snapshot_includes_steps_and_metrics() {
        let (pool, id) = setup();
        {
            let conn = pool.get().unwrap();
            steps::upsert_step(&conn, id, Stage::Ingest, StepStatus::Completed, Some(100), None)
                .unwrap();
            steps::upsert_step(&conn, id, Stage::Transcribe, StepStatus::Active, Some(0), None)
                .unwrap();
            distributions::record_published(&conn, id, Platform::Discord, None).unwrap();
            distributions::record_failed(&conn, id, Platform::Email, "bounced").unwrap();
        }

        let service = StatusService::new(pool);
        let snapshot = service.snapshot(id).unwrap();

        assert_eq!(snapshot.status, EpisodeStatus::Processing);
        assert_eq!(snapshot.steps.len(), 2);
        assert_eq!(snapshot.steps["ingest"].status, StepStatus::Completed);
        assert_eq!(snapshot.steps["transcribe"].status, StepStatus::Active);
        assert_eq!(snapshot.metrics.platforms, 2);
        assert_eq!(snapshot.metrics.total_reach, REACH_PER_PLATFORM);
        assert_eq!(snapshot.metrics.languages, 2);
    }

    #[test]
    fn test_step_view_serializes_camel_case() {
        let view = StepView {
            status: StepStatus::Completed,
            progress: 100,
            logs: vec![],
            error: None,
            started_at: None,
            completed_at: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("startedAt").is_some());
        assert!(json.get("completedAt").is_some());
    }
}
