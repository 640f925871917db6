//! Episode query operations.
//!
//! This module provides CRUD operations for episodes (the job record) and
//! the per-stage artifact writes. Each artifact write is a single UPDATE so
//! a partially written artifact is never visible to a reader.

use chrono::Utc;
use crosscast_common::{Adaptation, EpisodeId, EpisodeStatus, Error, Language, Result};
use rusqlite::{params, Connection, Row};

use crate::models::Episode;
use crate::queries::parse_ts;

/// Fields required to register a new episode.
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub title: String,
    pub description: String,
    pub source_language: Language,
    pub target_language: Language,
    pub media_url: String,
    pub file_size: i64,
}

const EPISODE_COLUMNS: &str = "id, title, description, source_language, target_language, \
     media_url, file_size, status, transcript, translated_text, adaptations, \
     audio_url, audio_voice_id, created_at, updated_at";

fn episode_from_row(row: &Row<'_>) -> rusqlite::Result<Episode> {
    let adaptations: Vec<Adaptation> = row
        .get::<_, Option<String>>(10)?
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default();

    Ok(Episode {
        id: row
            .get::<_, String>(0)?
            .parse::<EpisodeId>()
            .unwrap_or_default(),
        title: row.get(1)?,
        description: row.get(2)?,
        source_language: row
            .get::<_, String>(3)?
            .parse()
            .unwrap_or(Language::En),
        target_language: row
            .get::<_, String>(4)?
            .parse()
            .unwrap_or(Language::En),
        media_url: row.get(5)?,
        file_size: row.get(6)?,
        status: row
            .get::<_, String>(7)?
            .parse()
            .unwrap_or(EpisodeStatus::Processing),
        transcript: row.get(8)?,
        translated_text: row.get(9)?,
        adaptations,
        audio_url: row.get(11)?,
        audio_voice_id: row.get(12)?,
        created_at: parse_ts(&row.get::<_, String>(13)?),
        updated_at: parse_ts(&row.get::<_, String>(14)?),
    })
}

/// Create a new episode with status `processing`.
pub fn create_episode(conn: &Connection, new: &NewEpisode) -> Result<Episode> {
    let id = EpisodeId::new();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO episodes (id, title, description, source_language, target_language, \
         media_url, file_size, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id.to_string(),
            &new.title,
            &new.description,
            new.source_language.to_string(),
            new.target_language.to_string(),
            &new.media_url,
            new.file_size,
            EpisodeStatus::Processing.to_string(),
            now.to_rfc3339(),
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Episode {
        id,
        title: new.title.clone(),
        description: new.description.clone(),
        source_language: new.source_language,
        target_language: new.target_language,
        media_url: new.media_url.clone(),
        file_size: new.file_size,
        status: EpisodeStatus::Processing,
        transcript: None,
        translated_text: None,
        adaptations: Vec::new(),
        audio_url: None,
        audio_voice_id: None,
        created_at: now,
        updated_at: now,
    })
}

/// Get an episode by ID.
pub fn get_episode(conn: &Connection, id: EpisodeId) -> Result<Option<Episode>> {
    match conn.query_row(
        &format!("SELECT {EPISODE_COLUMNS} FROM episodes WHERE id = ?"),
        [id.to_string()],
        episode_from_row,
    ) {
        Ok(episode) => Ok(Some(episode)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List the most recently created episodes.
pub fn list_episodes(conn: &Connection, limit: usize) -> Result<Vec<Episode>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes ORDER BY created_at DESC LIMIT ?"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let episodes = stmt
        .query_map(params![limit as i64], episode_from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(episodes)
}

/// Set the overall lifecycle status of an episode.
pub fn set_status(conn: &Connection, id: EpisodeId, status: EpisodeStatus) -> Result<()> {
    let affected = conn
        .execute(
            "UPDATE episodes SET status = ?, updated_at = ? WHERE id = ?",
            params![status.to_string(), Utc::now().to_rfc3339(), id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("episode"));
    }

    Ok(())
}

/// Persist the transcript artifact (transcribe stage).
pub fn save_transcript(conn: &Connection, id: EpisodeId, transcript: &str) -> Result<()> {
    let affected = conn
        .execute(
            "UPDATE episodes SET transcript = ?, updated_at = ? WHERE id = ?",
            params![transcript, Utc::now().to_rfc3339(), id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("episode"));
    }

    Ok(())
}

/// Persist the translation artifact (translate stage).
///
/// Translated text and adaptation notes land in one UPDATE.
pub fn save_translation(
    conn: &Connection,
    id: EpisodeId,
    translated_text: &str,
    adaptations: &[Adaptation],
) -> Result<()> {
    let adaptations_json = serde_json::to_string(adaptations)
        .map_err(|e| Error::internal(format!("Failed to encode adaptations: {}", e)))?;

    let affected = conn
        .execute(
            "UPDATE episodes SET translated_text = ?, adaptations = ?, updated_at = ? WHERE id = ?",
            params![
                translated_text,
                adaptations_json,
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("episode"));
    }

    Ok(())
}

/// Persist the generated-audio artifact (voice stage).
pub fn save_audio(conn: &Connection, id: EpisodeId, audio_url: &str, voice_id: &str) -> Result<()> {
    let affected = conn
        .execute(
            "UPDATE episodes SET audio_url = ?, audio_voice_id = ?, updated_at = ? WHERE id = ?",
            params![audio_url, voice_id, Utc::now().to_rfc3339(), id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("episode"));
    }

    Ok(())
}
