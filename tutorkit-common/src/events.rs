//! Session event types and the event bus
//!
//! The orchestrator broadcasts `SessionEvent`s for the host to observe; the
//! host renders the conversation, the typing indicator, and the video player
//! from these without reaching into orchestrator state. Broadcasting uses
//! `tokio::broadcast` behind a thin `EventBus` wrapper so subscribers can
//! attach and detach freely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::conversation::{Turn, TurnId};
use crate::types::{Segment, SessionPhase};

/// Events emitted by the session orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A turn was appended to the conversation log
    TurnAppended {
        turn: Turn,
        timestamp: DateTime<Utc>,
    },

    /// The code of a fill-in-blanks turn was rewritten by the learner
    TurnCodeUpdated {
        turn_id: TurnId,
        code: String,
        timestamp: DateTime<Utc>,
    },

    /// Typing indicator toggled
    TypingChanged {
        typing: bool,
        timestamp: DateTime<Utc>,
    },

    /// Segmentation arrived for the selected video
    SegmentsLoaded {
        video_id: String,
        segments: Vec<Segment>,
        timestamp: DateTime<Utc>,
    },

    /// The advance gate opened or closed
    AdvanceGateChanged {
        may_advance: bool,
        timestamp: DateTime<Utc>,
    },

    /// Session lifecycle phase changed
    PhaseChanged {
        phase: SessionPhase,
        timestamp: DateTime<Utc>,
    },

    /// Code was inserted into a fresh notebook cell; the host should flash
    /// the cell for `flash_ms` before reverting its styling
    CodeCellInserted {
        code: String,
        flash_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Candidate answers for the blanks of a segment became available
    FillChoicesAvailable {
        segment_index: usize,
        choices: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for session events.
///
/// One-to-many: every subscriber receives every event emitted after it
/// subscribed. Slow subscribers lag and drop the oldest events rather than
/// backpressuring the orchestrator.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error when
    /// there are none; callers that don't care simply discard the result.
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Channel capacity this bus was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing_event(typing: bool) -> SessionEvent {
        SessionEvent::TypingChanged {
            typing,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn emit_without_subscribers_is_an_error() {
        let bus = EventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.emit(typing_event(true)).is_err());
    }

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(typing_event(true)).expect("one subscriber");
        match rx.recv().await.expect("event") {
            SessionEvent::TypingChanged { typing, .. } => assert!(typing),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn events_before_subscription_are_not_delivered() {
        let bus = EventBus::new(16);
        let mut early = bus.subscribe();
        bus.emit(typing_event(true)).expect("subscriber");

        let mut late = bus.subscribe();
        bus.emit(typing_event(false)).expect("subscribers");

        // The early subscriber sees both, the late one only the second.
        assert!(early.recv().await.is_ok());
        assert!(early.recv().await.is_ok());
        match late.recv().await.expect("event") {
            SessionEvent::TypingChanged { typing, .. } => assert!(!typing),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
