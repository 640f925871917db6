//! Step ledger access for the orchestrator and the status query service.

use std::collections::BTreeMap;

use crosscast_common::{EpisodeId, Result, Stage, StepStatus};
use crosscast_db::models::StepRecord;
use crosscast_db::pool::{get_conn, DbPool};
use crosscast_db::queries::steps;

/// Durable per-stage status/progress/log record keyed by (episode, stage).
///
/// Thin wrapper over the step queries; each call checks a connection out of
/// the pool for the duration of one statement only.
#[derive(Clone)]
pub struct StepLedger {
    pool: DbPool,
}

impl StepLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Idempotent merge of the (episode, stage) entry.
    pub fn upsert(
        &self,
        episode_id: EpisodeId,
        stage: Stage,
        status: StepStatus,
        progress: Option<i32>,
        error: Option<&str>,
    ) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        steps::upsert_step(&conn, episode_id, stage, status, progress, error)
    }

    /// Append one timestamped message to the stage's log.
    pub fn append_log(&self, episode_id: EpisodeId, stage: Stage, message: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        steps::append_log(&conn, episode_id, stage, message)
    }

    /// All recorded entries for an episode, keyed by stage id.
    pub fn get_all(&self, episode_id: EpisodeId) -> Result<BTreeMap<String, StepRecord>> {
        let conn = get_conn(&self.pool)?;
        let steps = steps::list_steps(&conn, episode_id)?;
        Ok(steps
            .into_iter()
            .map(|s| (s.step_id.to_string(), s))
            .collect())
    }

    /// One entry, if the stage has been touched.
    pub fn get(&self, episode_id: EpisodeId, stage: Stage) -> Result<Option<StepRecord>> {
        let conn = get_conn(&self.pool)?;
        steps::get_step(&conn, episode_id, stage)
    }
}
