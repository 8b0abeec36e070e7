//! Engine input commands
//!
//! The engine consumes these over its mpsc command channel; one command per
//! UI gesture or external completion. Output events live in
//! `tutorkit_common::events` and are re-exported here.

pub use tutorkit_common::events::{EventBus, SessionEvent};

use tutorkit_common::conversation::TurnId;

use crate::notebook::CellOutput;

/// Inputs to the session engine.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Learner submitted text (or the engine re-sent on the learner's
    /// behalf; auto-continue sends carry an empty string)
    LearnerSend { text: String },

    /// Learner asked for a fuller explanation of a tutor turn; the prefixed
    /// question is sent without logging a fresh learner turn
    ExplainMore { text: String },

    /// The host notebook finished executing a cell
    CellExecuted {
        source: String,
        cell_type: String,
        outputs: Vec<CellOutput>,
    },

    /// The video player reached the end of the segment being watched
    VideoEnded { category: String },

    /// Learner pressed the "go on" affordance
    GoOn,

    /// Learner picked a multiple-choice answer (empty clears the selection)
    ChoiceSelected { choice: String },

    /// Learner edited the code of a fill-in-blanks turn
    BlanksEdited { turn_id: TurnId, code: String },
}
