//! Internal Rust models matching the database schema.
//!
//! This module provides strongly-typed structures that map to database tables.
//! All models use types from crosscast-common where appropriate.

use chrono::{DateTime, Utc};
use crosscast_common::{
    Adaptation, DistributionStatus, EpisodeId, EpisodeStatus, Language, Platform, Stage,
    StepStatus,
};
use serde::{Deserialize, Serialize};

/// Episode model: one localization job and its accumulated artifacts.
///
/// Each artifact is written by exactly one pipeline stage and stays `None`
/// until that stage completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub id: EpisodeId,
    pub title: String,
    pub description: String,
    pub source_language: Language,
    pub target_language: Language,
    /// Opaque location of the uploaded source media; never interpreted here.
    pub media_url: String,
    pub file_size: i64,
    pub status: EpisodeStatus,
    /// Transcript artifact (transcribe stage).
    pub transcript: Option<String>,
    /// Translation artifact (translate stage); written together with
    /// `adaptations` in a single update.
    pub translated_text: Option<String>,
    pub adaptations: Vec<Adaptation>,
    /// Generated-audio artifact (voice stage).
    pub audio_url: Option<String>,
    pub audio_voice_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Step ledger entry: durable status/progress/log record for one
/// (episode, stage) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub episode_id: EpisodeId,
    pub step_id: Stage,
    pub status: StepStatus,
    pub progress: i32,
    /// Append-only log of timestamped messages.
    pub logs: Vec<String>,
    /// Recorded failure text. Retained once set, even if the step is later
    /// marked completed (non-fatal stage failures).
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Distribution outcome: publish result for one (episode, platform) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Distribution {
    pub episode_id: EpisodeId,
    pub platform: Platform,
    pub status: DistributionStatus,
    /// URL of the published post/upload, when the platform returns one.
    pub platform_url: Option<String>,
    pub error: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
