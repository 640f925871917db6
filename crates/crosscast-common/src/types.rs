//! Core type definitions for episodes, pipeline stages, and distribution.
//!
//! All enums are serialized in lowercase, matching both the database column
//! values and the wire format of the status API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported content languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// Spanish.
    Es,
    /// German.
    De,
    /// French.
    Fr,
    /// Portuguese.
    Pt,
}

impl Language {
    /// Human-readable language name, used in listener-facing payloads.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Spanish",
            Self::De => "German",
            Self::Fr => "French",
            Self::Pt => "Portuguese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Es => write!(f, "es"),
            Self::De => write!(f, "de"),
            Self::Fr => write!(f, "fr"),
            Self::Pt => write!(f, "pt"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            "de" => Ok(Self::De),
            "fr" => Ok(Self::Fr),
            "pt" => Ok(Self::Pt),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

/// Distribution platforms an episode can be published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// YouTube video upload.
    Youtube,
    /// LinkedIn feed post.
    Linkedin,
    /// Discord webhook announcement.
    Discord,
    /// Subscriber email blast.
    Email,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Youtube => write!(f, "youtube"),
            Self::Linkedin => write!(f, "linkedin"),
            Self::Discord => write!(f, "discord"),
            Self::Email => write!(f, "email"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Self::Youtube),
            "linkedin" => Ok(Self::Linkedin),
            "discord" => Ok(Self::Discord),
            "email" => Ok(Self::Email),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

/// The fixed pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Acknowledge the uploaded media (cosmetic progress only).
    Ingest,
    /// Speech-to-text on the source media.
    Transcribe,
    /// Culturally adapted translation of the transcript.
    Translate,
    /// Target-language speech synthesis.
    Voice,
    /// Platform payload preparation (bookkeeping).
    Format,
    /// Multi-platform publish.
    Distribute,
}

impl Stage {
    /// All stages in pipeline execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Ingest,
        Stage::Transcribe,
        Stage::Translate,
        Stage::Voice,
        Stage::Format,
        Stage::Distribute,
    ];

    /// Position of this stage in the pipeline sequence (0-based).
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest => write!(f, "ingest"),
            Self::Transcribe => write!(f, "transcribe"),
            Self::Translate => write!(f, "translate"),
            Self::Voice => write!(f, "voice"),
            Self::Format => write!(f, "format"),
            Self::Distribute => write!(f, "distribute"),
        }
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ingest" => Ok(Self::Ingest),
            "transcribe" => Ok(Self::Transcribe),
            "translate" => Ok(Self::Translate),
            "voice" => Ok(Self::Voice),
            "format" => Ok(Self::Format),
            "distribute" => Ok(Self::Distribute),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

/// Overall lifecycle status of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeStatus {
    /// Pipeline has not reached a terminal state yet.
    Processing,
    /// Pipeline reached its final stage.
    Completed,
    /// A fatal stage error aborted the pipeline.
    Failed,
}

impl EpisodeStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for EpisodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid episode status: {}", s)),
        }
    }
}

/// Status of a single (episode, stage) ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Stage has not been reached yet.
    Pending,
    /// Stage is currently executing.
    Active,
    /// Stage finished (possibly with a recorded, non-fatal error).
    Completed,
    /// Stage failed fatally.
    Error,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid step status: {}", s)),
        }
    }
}

/// Outcome of a publish attempt for one (episode, platform) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionStatus {
    /// The platform accepted the publish.
    Published,
    /// The platform adapter errored; the error text is recorded alongside.
    Failed,
}

impl fmt::Display for DistributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => write!(f, "published"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for DistributionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid distribution status: {}", s)),
        }
    }
}

/// One cultural adaptation made during translation.
///
/// The translation adapter returns these alongside the translated text; they
/// are stored verbatim as part of the episode's translation artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adaptation {
    /// Fragment of the source text that was adapted.
    pub original: String,
    /// Replacement fragment in the target language.
    pub adapted: String,
    /// Why the adaptation was made (idiom, humor, cultural reference, ...).
    pub reason: String,
    /// Character offset of the fragment in the source text.
    pub position: i64,
}
