//! # tutorkit-common
//!
//! Shared vocabulary for the tutorkit session orchestrator: video segment
//! types, conversation turns, the backend wire protocol, session output
//! events, and configuration resolution.
//!
//! Everything here is consumed by `tutorkit-core` and by host adapters that
//! render the conversation or embed the video player.

pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod protocol;
pub mod types;

pub use error::{Error, Result};
pub use events::{EventBus, SessionEvent};
pub use types::{Segment, SessionPhase};
