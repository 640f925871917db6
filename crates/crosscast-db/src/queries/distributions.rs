//! Distribution outcome query operations.
//!
//! One outcome per (episode, platform) per pipeline run: recording an
//! outcome replaces any earlier row for the same pair, and a failed target
//! never blocks recording the others.

use chrono::Utc;
use crosscast_common::{DistributionStatus, EpisodeId, Error, Platform, Result};
use rusqlite::{params, Connection, Row};

use crate::models::Distribution;
use crate::queries::{parse_opt_ts, parse_ts};

const DISTRIBUTION_COLUMNS: &str =
    "episode_id, platform, status, platform_url, error, published_at, created_at";

fn distribution_from_row(row: &Row<'_>) -> rusqlite::Result<Distribution> {
    Ok(Distribution {
        episode_id: row
            .get::<_, String>(0)?
            .parse::<EpisodeId>()
            .unwrap_or_default(),
        platform: row
            .get::<_, String>(1)?
            .parse()
            .unwrap_or(Platform::Discord),
        status: row
            .get::<_, String>(2)?
            .parse()
            .unwrap_or(DistributionStatus::Failed),
        platform_url: row.get(3)?,
        error: row.get(4)?,
        published_at: parse_opt_ts(row.get(5)?),
        created_at: parse_ts(&row.get::<_, String>(6)?),
    })
}

/// Record a successful publish with its timestamp.
pub fn record_published(
    conn: &Connection,
    episode_id: EpisodeId,
    platform: Platform,
    platform_url: Option<&str>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT OR REPLACE INTO distributions \
             (episode_id, platform, status, platform_url, error, published_at, created_at)
         VALUES (?, ?, ?, ?, NULL, ?, ?)",
        params![
            episode_id.to_string(),
            platform.to_string(),
            DistributionStatus::Published.to_string(),
            platform_url,
            now,
            now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Record a failed publish with its error text.
pub fn record_failed(
    conn: &Connection,
    episode_id: EpisodeId,
    platform: Platform,
    error: &str,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT OR REPLACE INTO distributions \
             (episode_id, platform, status, platform_url, error, published_at, created_at)
         VALUES (?, ?, ?, NULL, ?, NULL, ?)",
        params![
            episode_id.to_string(),
            platform.to_string(),
            DistributionStatus::Failed.to_string(),
            error,
            now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// List all recorded outcomes for an episode.
pub fn list_outcomes(conn: &Connection, episode_id: EpisodeId) -> Result<Vec<Distribution>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {DISTRIBUTION_COLUMNS} FROM distributions WHERE episode_id = ? ORDER BY platform"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let outcomes = stmt
        .query_map([episode_id.to_string()], distribution_from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(outcomes)
}
