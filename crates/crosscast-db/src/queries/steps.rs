//! Step ledger query operations.
//!
//! One row per (episode, stage), monotonically upserted: writes merge into
//! the existing row, never duplicate it. `started_at` and `completed_at`
//! stick on their first transition and are never overwritten; a recorded
//! error survives later upserts so a stage can end `completed` with its
//! failure text still visible.

use chrono::Utc;
use crosscast_common::{EpisodeId, Error, Result, Stage, StepStatus};
use rusqlite::{params, Connection, Row};

use crate::models::StepRecord;
use crate::queries::{parse_opt_ts, parse_ts};

const STEP_COLUMNS: &str =
    "episode_id, step_id, status, progress, logs, error, started_at, completed_at, updated_at";

fn step_from_row(row: &Row<'_>) -> rusqlite::Result<StepRecord> {
    let logs: Vec<String> = serde_json::from_str(&row.get::<_, String>(4)?).unwrap_or_default();

    Ok(StepRecord {
        episode_id: row
            .get::<_, String>(0)?
            .parse::<EpisodeId>()
            .unwrap_or_default(),
        step_id: row.get::<_, String>(1)?.parse().unwrap_or(Stage::Ingest),
        status: row
            .get::<_, String>(2)?
            .parse()
            .unwrap_or(StepStatus::Pending),
        progress: row.get(3)?,
        logs,
        error: row.get(5)?,
        started_at: parse_opt_ts(row.get(6)?),
        completed_at: parse_opt_ts(row.get(7)?),
        updated_at: parse_ts(&row.get::<_, String>(8)?),
    })
}

/// Upsert the ledger entry for one (episode, stage) pair.
///
/// A `None` progress or error keeps whatever the row already holds.
/// `started_at` is stamped on the first transition into `active`,
/// `completed_at` on the first transition into `completed`.
pub fn upsert_step(
    conn: &Connection,
    episode_id: EpisodeId,
    stage: Stage,
    status: StepStatus,
    progress: Option<i32>,
    error: Option<&str>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    let started_at = (status == StepStatus::Active).then(|| now.clone());
    let completed_at = (status == StepStatus::Completed).then(|| now.clone());

    conn.execute(
        "INSERT INTO processing_steps \
             (episode_id, step_id, status, progress, logs, error, started_at, completed_at, updated_at)
         VALUES (?1, ?2, ?3, COALESCE(?4, 0), '[]', ?5, ?6, ?7, ?8)
         ON CONFLICT(episode_id, step_id) DO UPDATE SET
             status = excluded.status,
             progress = COALESCE(?4, progress),
             error = COALESCE(?5, error),
             started_at = COALESCE(started_at, ?6),
             completed_at = COALESCE(completed_at, ?7),
             updated_at = ?8",
        params![
            episode_id.to_string(),
            stage.to_string(),
            status.to_string(),
            progress,
            error,
            started_at,
            completed_at,
            now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Append one timestamped message to a step's log.
///
/// The push is a single atomic UPDATE (`json_insert` into the JSON array),
/// so concurrent appends cannot lose entries. Appending to a stage that has
/// not been touched yet creates its `pending` row.
pub fn append_log(
    conn: &Connection,
    episode_id: EpisodeId,
    stage: Stage,
    message: &str,
) -> Result<()> {
    let now = Utc::now();
    let line = format!("[{}] {}", now.to_rfc3339(), message);

    let affected = conn
        .execute(
            "UPDATE processing_steps
             SET logs = json_insert(logs, '$[#]', ?3), updated_at = ?4
             WHERE episode_id = ?1 AND step_id = ?2",
            params![
                episode_id.to_string(),
                stage.to_string(),
                line,
                now.to_rfc3339()
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        conn.execute(
            "INSERT INTO processing_steps (episode_id, step_id, status, progress, logs, updated_at)
             VALUES (?1, ?2, ?3, 0, json_array(?4), ?5)",
            params![
                episode_id.to_string(),
                stage.to_string(),
                StepStatus::Pending.to_string(),
                line,
                now.to_rfc3339()
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }

    Ok(())
}

/// Get the ledger entry for one (episode, stage) pair.
pub fn get_step(conn: &Connection, episode_id: EpisodeId, stage: Stage) -> Result<Option<StepRecord>> {
    match conn.query_row(
        &format!("SELECT {STEP_COLUMNS} FROM processing_steps WHERE episode_id = ?1 AND step_id = ?2"),
        params![episode_id.to_string(), stage.to_string()],
        step_from_row,
    ) {
        Ok(step) => Ok(Some(step)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all ledger entries for an episode.
pub fn list_steps(conn: &Connection, episode_id: EpisodeId) -> Result<Vec<StepRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {STEP_COLUMNS} FROM processing_steps WHERE episode_id = ?"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let steps = stmt
        .query_map([episode_id.to_string()], step_from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{init_memory_pool, PooledConnection};
    use crate::queries::episodes::{self, NewEpisode};
    use crosscast_common::Language;

    fn setup() -> (PooledConnection, EpisodeId) {
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
        (conn, episode.id)
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let (conn, id) = setup();

        upsert_step(&conn, id, Stage::Transcribe, StepStatus::Active, Some(0), None).unwrap();
        upsert_step(&conn, id, Stage::Transcribe, StepStatus::Completed, Some(100), None).unwrap();

        // Exactly one row for the (episode, stage) pair, reflecting the
        // latest status.
        let steps = list_steps(&conn, id).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].status, StepStatus::Completed);
        assert_eq!(steps[0].progress, 100);
    }

    #[test]
    fn test_started_at_never_overwritten() {
        let (conn, id) = setup();

        upsert_step(&conn, id, Stage::Ingest, StepStatus::Active, Some(0), None).unwrap();
        let first = get_step(&conn, id, Stage::Ingest).unwrap().unwrap();
        let started = first.started_at.unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        upsert_step(&conn, id, Stage::Ingest, StepStatus::Active, Some(40), None).unwrap();
        upsert_step(&conn, id, Stage::Ingest, StepStatus::Completed, Some(100), None).unwrap();

        let last = get_step(&conn, id, Stage::Ingest).unwrap().unwrap();
        assert_eq!(last.started_at.unwrap(), started);
        assert!(last.completed_at.is_some());
    }

    #[test]
    fn test_progress_kept_when_not_supplied() {
        let (conn, id) = setup();

        upsert_step(&conn, id, Stage::Voice, StepStatus::Active, Some(60), None).unwrap();
        upsert_step(&conn, id, Stage::Voice, StepStatus::Error, None, Some("synth down")).unwrap();

        let step = get_step(&conn, id, Stage::Voice).unwrap().unwrap();
        assert_eq!(step.progress, 60);
        assert_eq!(step.error.as_deref(), Some("synth down"));
    }

    #[test]
    fn test_error_survives_later_completion() {
        let (conn, id) = setup();

        // Degraded path: record the error, then mark the stage completed.
        upsert_step(&conn, id, Stage::Voice, StepStatus::Active, Some(0), None).unwrap();
        upsert_step(&conn, id, Stage::Voice, StepStatus::Error, None, Some("provider 503")).unwrap();
        upsert_step(&conn, id, Stage::Voice, StepStatus::Completed, Some(100), None).unwrap();

        let step = get_step(&conn, id, Stage::Voice).unwrap().unwrap();
        assert_eq!(step.status, StepStatus::Completed);
        assert_eq!(step.error.as_deref(), Some("provider 503"));
    }

    #[test]
    fn test_append_log() {
        let (conn, id) = setup();

        upsert_step(&conn, id, Stage::Transcribe, StepStatus::Active, Some(0), None).unwrap();
        append_log(&conn, id, Stage::Transcribe, "Starting transcription").unwrap();
        append_log(&conn, id, Stage::Transcribe, "Transcribed 13 characters").unwrap();

        let step = get_step(&conn, id, Stage::Transcribe).unwrap().unwrap();
        assert_eq!(step.logs.len(), 2);
        assert!(step.logs[0].contains("Starting transcription"));
        assert!(step.logs[1].contains("Transcribed 13 characters"));
    }

    #[test]
    fn test_append_log_creates_pending_row() {
        let (conn, id) = setup();

        append_log(&conn, id, Stage::Format, "early note").unwrap();

        let step = get_step(&conn, id, Stage::Format).unwrap().unwrap();
        assert_eq!(step.status, StepStatus::Pending);
        assert_eq!(step.logs.len(), 1);
        assert!(step.logs[0].contains("early note"));
    }

    #[test]
    fn test_untouched_stage_has_no_row() {
        let (conn, id) = setup();

        upsert_step(&conn, id, Stage::Ingest, StepStatus::Completed, Some(100), None).unwrap();

        assert!(get_step(&conn, id, Stage::Distribute).unwrap().is_none());
        assert_eq!(list_steps(&conn, id).unwrap().len(), 1);
    }

    #[test]
    fn test_steps_isolated_per_episode() {
        let (conn, id) = setup();
        let other = episodes::create_episode(
            &conn,
            &NewEpisode {
                title: "Episode 2".into(),
                description: String::new(),
                source_language: Language::En,
                target_language: Language::Es,
                media_url: "mem://ep2.mp3".into(),
                file_size: 0,
            },
        )
        .unwrap();

        upsert_step(&conn, id, Stage::Ingest, StepStatus::Completed, Some(100), None).unwrap();
        upsert_step(&conn, other.id, Stage::Ingest, StepStatus::Active, Some(20), None).unwrap();

        let a = get_step(&conn, id, Stage::Ingest).unwrap().unwrap();
        let b = get_step(&conn, other.id, Stage::Ingest).unwrap().unwrap();
        assert_eq!(a.status, StepStatus::Completed);
        assert_eq!(b.status, StepStatus::Active);
    }
}
