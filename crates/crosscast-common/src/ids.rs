//! Typed ID wrapper for episodes.
//!
//! A newtype around `Uuid` so an episode id cannot be confused with any other
//! string or uuid flowing through the system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an episode (one localization job).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(Uuid);

impl EpisodeId {
    /// Generate a new random episode ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EpisodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EpisodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EpisodeId> for Uuid {
    fn from(id: EpisodeId) -> Self {
        id.0
    }
}

impl std::str::FromStr for EpisodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_id_creation() {
        let id1 = EpisodeId::new();
        let id2 = EpisodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_episode_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = EpisodeId::from(uuid);
        let uuid_back: Uuid = id.into();
        assert_eq!(uuid, uuid_back);
    }

    #[test]
    fn test_episode_id_roundtrip_via_str() {
        let id = EpisodeId::new();
        let parsed: EpisodeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_episode_id_serialization() {
        let id = EpisodeId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: EpisodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
