//! # Tutoring Session Orchestration Core (tutorkit-core)
//!
//! Client-resident state machine that sequences a learner through segments
//! of an instructional video interleaved with guided coding exercises in a
//! notebook.
//!
//! **Purpose:** reconcile three asynchronous event sources (learner chat
//! input, notebook cell execution, video playback completion) into a single
//! coherent conversation timeline, and drive the request/response protocol
//! against the tutoring backend.
//!
//! **Architecture:** a single-writer command loop (`engine::SessionEngine`)
//! over an mpsc channel, shared session state behind `Arc<SharedState>` so
//! long-lived callbacks always observe current values, and a broadcast
//! `EventBus` the host renders from.

pub mod codeblock;
pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod log;
pub mod notebook;
pub mod policy;
pub mod prompts;
pub mod state;

pub use engine::SessionEngine;
pub use error::{Error, Result};
pub use events::SessionCommand;
pub use log::ConversationLog;
pub use state::SharedState;
