//! Pipeline event broadcasting.
//!
//! Every ledger transition is mirrored as a discrete event on a broadcast
//! channel. Polling the status endpoint remains the external contract; the
//! bus exists so a push transport can subscribe later without changes to
//! the orchestrator.

use crosscast_common::{EpisodeId, Stage};
use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A pipeline state transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A stage has started executing.
    StepStarted { episode_id: EpisodeId, step: Stage },
    /// A stage reported progress.
    StepProgress {
        episode_id: EpisodeId,
        step: Stage,
        progress: i32,
    },
    /// A stage finished.
    StepCompleted { episode_id: EpisodeId, step: Stage },
    /// A stage recorded a failure (fatal or degraded).
    StepFailed {
        episode_id: EpisodeId,
        step: Stage,
        error: String,
    },
    /// The episode reached its final stage.
    EpisodeCompleted { episode_id: EpisodeId },
    /// A fatal stage error aborted the episode.
    EpisodeFailed {
        episode_id: EpisodeId,
        error: String,
    },
}

/// Broadcast fan-out for pipeline events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all subscribers.
    pub fn broadcast(&self, event: PipelineEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("No subscribers for pipeline event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let id = EpisodeId::new();
        bus.broadcast(PipelineEvent::StepStarted {
            episode_id: id,
            step: Stage::Ingest,
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            PipelineEvent::StepStarted { episode_id, step: Stage::Ingest } if episode_id == id
        ));
    }

    #[test]
    fn test_broadcast_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.broadcast(PipelineEvent::EpisodeCompleted {
            episode_id: EpisodeId::new(),
        });
    }
}
