//! Append-only conversation log
//!
//! The single source of render truth and audit trail. Turns are created by
//! the engine and never mutated after append, with one carve-out: the code
//! of a fill-in-blanks turn is rewritten in place as the learner fills it.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use tutorkit_common::conversation::{Direction, Interaction, Turn, TurnId};
use tutorkit_common::types::SegmentRef;

use crate::error::{Error, Result};

/// A turn awaiting an id, handed to [`ConversationLog::append`].
#[derive(Debug, Clone)]
pub struct TurnDraft {
    pub direction: Direction,
    pub text: String,
    pub sender: String,
    pub sent_time: String,
    pub interaction: Option<Interaction>,
    pub code: Option<String>,
    pub segment: Option<SegmentRef>,
}

impl TurnDraft {
    /// Plain message with no widget, code or segment metadata.
    pub fn message(
        direction: Direction,
        sender: impl Into<String>,
        text: impl Into<String>,
        sent_time: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            text: text.into(),
            sender: sender.into(),
            sent_time: sent_time.into(),
            interaction: Some(Interaction::PlainText),
            code: None,
            segment: None,
        }
    }

    pub fn with_interaction(mut self, interaction: Option<Interaction>) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn with_segment(mut self, segment: Option<SegmentRef>) -> Self {
        self.segment = segment;
        self
    }
}

/// Ordered, append-only sequence of conversation turns.
pub struct ConversationLog {
    turns: RwLock<Vec<Turn>>,
    next_id: AtomicU64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            turns: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Assign the next id, append, and return the stored turn.
    pub async fn append(&self, draft: TurnDraft) -> Turn {
        let id = TurnId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let turn = Turn {
            id,
            direction: draft.direction,
            text: draft.text,
            sender: draft.sender,
            sent_time: draft.sent_time,
            interaction: draft.interaction,
            code: draft.code,
            segment: draft.segment,
        };
        self.turns.write().await.push(turn.clone());
        turn
    }

    /// Read-only projection of the full log, in append order.
    pub async fn snapshot(&self) -> Vec<Turn> {
        self.turns.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }

    pub async fn get(&self, id: TurnId) -> Option<Turn> {
        self.turns.read().await.iter().find(|t| t.id == id).cloned()
    }

    /// Rewrite the code of a fill-in-blanks turn in place.
    ///
    /// Any other turn kind is refused: everything but a fill-in-blanks code
    /// body is immutable after append.
    pub async fn update_code(&self, id: TurnId, code: impl Into<String>) -> Result<Turn> {
        let mut turns = self.turns.write().await;
        let turn = turns
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::Conversation(format!("no turn {id}")))?;
        if turn.interaction != Some(Interaction::FillInBlanks) {
            return Err(Error::Conversation(format!(
                "turn {id} is not a fill-in-blanks turn"
            )));
        }
        turn.code = Some(code.into());
        Ok(turn.clone())
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}
