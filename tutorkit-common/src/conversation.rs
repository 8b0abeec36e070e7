//! Conversation turn types
//!
//! A turn is one entry in the conversation log, either learner- or
//! tutor-authored. Turns are immutable after append, with one exception:
//! the `code` of a fill-in-blanks turn is rewritten as the learner fills
//! the blanks.

use serde::{Deserialize, Serialize};

use crate::types::SegmentRef;

/// Unique, generation-ordered turn identifier.
///
/// Ids increase monotonically within a session, so they double as a stable
/// render key and as the dedupe key for fill-in-blank completion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TurnId(pub u64);

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Tutor-authored
    Incoming,
    /// Learner-authored
    Outgoing,
}

/// Secondary widget a turn asks the host to render under the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    #[serde(rename = "plain-text")]
    PlainText,
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "drop-down")]
    DropDown,
    #[serde(rename = "fill-in-blanks")]
    FillInBlanks,
    #[serde(rename = "show-code")]
    ShowCode,
}

impl Interaction {
    /// Parse the backend's interaction tag.
    ///
    /// The backend emits a few spellings for plain text ("plain text",
    /// "plain-text", "auto-reply"); anything unrecognized degrades to
    /// `PlainText` so a drifting backend never breaks rendering.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "plain text" | "plain-text" | "auto-reply" => Interaction::PlainText,
            "multiple-choice" => Interaction::MultipleChoice,
            "drop-down" => Interaction::DropDown,
            "fill-in-blanks" => Interaction::FillInBlanks,
            "show-code" => Interaction::ShowCode,
            other => {
                tracing::warn!(tag = other, "unknown interaction tag, treating as plain text");
                Interaction::PlainText
            }
        }
    }
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub direction: Direction,
    /// Message body with any fenced code blocks already removed
    pub text: String,
    /// Display name of the author
    pub sender: String,
    /// Display label, not necessarily a true timestamp ("just now",
    /// "42 seconds", a segment start time)
    pub sent_time: String,
    /// Secondary widget tag; `None` renders the message alone
    pub interaction: Option<Interaction>,
    /// Code block extracted from the tutor reply, if any
    pub code: Option<String>,
    /// Segment metadata when the turn opens a chapter
    pub segment: Option<SegmentRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_ids_are_ordered_and_stable_keys() {
        assert!(TurnId(1) < TurnId(2));
        assert_eq!(TurnId(7).to_string(), "msg-7");
    }

    #[test]
    fn plain_text_spellings_parse() {
        assert_eq!(Interaction::from_tag("plain text"), Interaction::PlainText);
        assert_eq!(Interaction::from_tag("plain-text"), Interaction::PlainText);
        assert_eq!(Interaction::from_tag("auto-reply"), Interaction::PlainText);
    }

    #[test]
    fn widget_tags_parse() {
        assert_eq!(
            Interaction::from_tag("multiple-choice"),
            Interaction::MultipleChoice
        );
        assert_eq!(Interaction::from_tag("drop-down"), Interaction::DropDown);
        assert_eq!(
            Interaction::from_tag("fill-in-blanks"),
            Interaction::FillInBlanks
        );
        assert_eq!(Interaction::from_tag("show-code"), Interaction::ShowCode);
    }

    #[test]
    fn unknown_tag_degrades_to_plain_text() {
        assert_eq!(Interaction::from_tag("hologram"), Interaction::PlainText);
        assert_eq!(Interaction::from_tag(""), Interaction::PlainText);
    }
}
