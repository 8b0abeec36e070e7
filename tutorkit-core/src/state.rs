//! Shared session state
//!
//! Thread-safe canonical session variables, shared between the engine and
//! handlers that outlive individual turns (notebook execution and video-end
//! callbacks registered once at session start). Those handlers read through
//! this struct instead of values captured at registration time, so a
//! late-firing callback always observes the current segment index, video id
//! and advance gate.
//!
//! Uses RwLock fields for concurrent read access with rare writes, following
//! the single-writer discipline of the engine's command loop.

use tokio::sync::RwLock;
use uuid::Uuid;

use tutorkit_common::events::{EventBus, SessionEvent};
use tutorkit_common::types::{Segment, SessionPhase};

/// Default kernel type reported to the backend when the notebook host does
/// not expose one (the deployed notebooks run the R kernel).
pub const DEFAULT_KERNEL_TYPE: &str = "ir";

/// Shared state accessible by all components of a session.
pub struct SharedState {
    /// Opaque learner identifier
    user_id: RwLock<String>,

    /// Generated once at session start, stable for the session's lifetime
    session_id: String,

    /// Kernel type name forwarded with chat turns
    kernel_type: RwLock<String>,

    /// Session lifecycle phase
    phase: RwLock<SessionPhase>,

    /// Selected video; write-once
    video_id: RwLock<Option<String>>,

    /// Segmentation of the selected video, fetched once per video
    segments: RwLock<Vec<Segment>>,

    /// 0-based index of the active segment; monotonically non-decreasing
    current_segment_index: RwLock<usize>,

    /// Gate controlling whether the learner may progress past the segment
    may_advance: RwLock<bool>,

    /// Typing indicator (the only visible proxy for an in-flight request)
    typing: RwLock<bool>,

    /// Traceback of the last failed cell execution, pending auto-submission
    pending_code_error: RwLock<Option<String>>,

    /// The next send is an "explain more" request and must not be logged as
    /// a fresh learner turn
    explain_more: RwLock<bool>,

    /// A deferred send still needs to fire once the video id is in place
    awaiting_dispatch: RwLock<bool>,

    /// Multiple-choice selection made since the last send
    selected_choice: RwLock<Option<String>>,

    /// The current segment's end-of-video auto-continue already fired
    video_end_sent: RwLock<bool>,

    /// Event broadcaster for host observers
    events: EventBus,
}

impl SharedState {
    /// Create state for a fresh session. The session id is generated here
    /// and never changes.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: RwLock::new(user_id.into()),
            session_id: format!("session_{}", Uuid::new_v4()),
            kernel_type: RwLock::new(DEFAULT_KERNEL_TYPE.to_string()),
            phase: RwLock::new(SessionPhase::SelectingVideo),
            video_id: RwLock::new(None),
            segments: RwLock::new(Vec::new()),
            current_segment_index: RwLock::new(0),
            may_advance: RwLock::new(false),
            typing: RwLock::new(false),
            pending_code_error: RwLock::new(None),
            explain_more: RwLock::new(false),
            awaiting_dispatch: RwLock::new(false),
            selected_choice: RwLock::new(None),
            video_end_sent: RwLock::new(false),
            events: EventBus::new(256),
        }
    }

    /// Broadcast an event to all host observers.
    pub fn broadcast(&self, event: SessionEvent) {
        // No subscribers is fine (headless tests, early startup)
        let _ = self.events.emit(event);
    }

    /// Subscribe to the session event stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn user_id(&self) -> String {
        self.user_id.read().await.clone()
    }

    pub async fn set_user_id(&self, user_id: impl Into<String>) {
        *self.user_id.write().await = user_id.into();
    }

    pub async fn kernel_type(&self) -> String {
        self.kernel_type.read().await.clone()
    }

    pub async fn set_kernel_type(&self, kernel_type: impl Into<String>) {
        *self.kernel_type.write().await = kernel_type.into();
    }

    pub async fn phase(&self) -> SessionPhase {
        *self.phase.read().await
    }

    pub async fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write().await = phase;
    }

    pub async fn video_id(&self) -> Option<String> {
        self.video_id.read().await.clone()
    }

    /// Set the video id. Write-once: returns false (and leaves the stored
    /// value untouched) if a video was already selected.
    pub async fn set_video_id(&self, video_id: impl Into<String>) -> bool {
        let mut guard = self.video_id.write().await;
        if guard.is_some() {
            return false;
        }
        *guard = Some(video_id.into());
        true
    }

    pub async fn segments(&self) -> Vec<Segment> {
        self.segments.read().await.clone()
    }

    pub async fn set_segments(&self, segments: Vec<Segment>) {
        *self.segments.write().await = segments;
    }

    pub async fn segment_index(&self) -> usize {
        *self.current_segment_index.read().await
    }

    /// Advance the segment index. Monotonic: a value at or below the current
    /// index is ignored. Returns the index after the call.
    pub async fn advance_segment_index(&self, index: usize) -> usize {
        let mut guard = self.current_segment_index.write().await;
        if index > *guard {
            *guard = index;
        } else if index < *guard {
            tracing::warn!(
                requested = index,
                current = *guard,
                "refusing to move segment index backwards"
            );
        }
        *guard
    }

    pub async fn may_advance(&self) -> bool {
        *self.may_advance.read().await
    }

    pub async fn set_may_advance(&self, may_advance: bool) {
        *self.may_advance.write().await = may_advance;
    }

    pub async fn typing(&self) -> bool {
        *self.typing.read().await
    }

    pub async fn set_typing(&self, typing: bool) {
        *self.typing.write().await = typing;
    }

    pub async fn pending_code_error(&self) -> Option<String> {
        self.pending_code_error.read().await.clone()
    }

    pub async fn set_pending_code_error(&self, error: impl Into<String>) {
        *self.pending_code_error.write().await = Some(error.into());
    }

    pub async fn clear_pending_code_error(&self) {
        *self.pending_code_error.write().await = None;
    }

    pub async fn explain_more(&self) -> bool {
        *self.explain_more.read().await
    }

    pub async fn set_explain_more(&self, explain_more: bool) {
        *self.explain_more.write().await = explain_more;
    }

    /// Consume the awaiting-dispatch flag, returning whether it was set.
    pub async fn take_awaiting_dispatch(&self) -> bool {
        let mut guard = self.awaiting_dispatch.write().await;
        std::mem::take(&mut *guard)
    }

    pub async fn set_awaiting_dispatch(&self) {
        *self.awaiting_dispatch.write().await = true;
    }

    pub async fn selected_choice(&self) -> Option<String> {
        self.selected_choice.read().await.clone()
    }

    pub async fn set_selected_choice(&self, choice: impl Into<String>) {
        let choice = choice.into();
        *self.selected_choice.write().await = if choice.is_empty() {
            None
        } else {
            Some(choice)
        };
    }

    pub async fn clear_selected_choice(&self) {
        *self.selected_choice.write().await = None;
    }

    pub async fn video_end_sent(&self) -> bool {
        *self.video_end_sent.read().await
    }

    pub async fn set_video_end_sent(&self, sent: bool) {
        *self.video_end_sent.write().await = sent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn video_id_is_write_once() {
        let state = SharedState::new("u1");
        assert!(state.video_id().await.is_none());

        assert!(state.set_video_id("abc123").await);
        assert_eq!(state.video_id().await.as_deref(), Some("abc123"));

        assert!(!state.set_video_id("other").await);
        assert_eq!(state.video_id().await.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn segment_index_never_decreases() {
        let state = SharedState::new("u1");
        assert_eq!(state.advance_segment_index(2).await, 2);
        assert_eq!(state.advance_segment_index(1).await, 2);
        assert_eq!(state.advance_segment_index(2).await, 2);
        assert_eq!(state.advance_segment_index(3).await, 3);
    }

    #[tokio::test]
    async fn awaiting_dispatch_is_consumed_once() {
        let state = SharedState::new("u1");
        assert!(!state.take_awaiting_dispatch().await);

        state.set_awaiting_dispatch().await;
        assert!(state.take_awaiting_dispatch().await);
        assert!(!state.take_awaiting_dispatch().await);
    }

    #[tokio::test]
    async fn empty_choice_clears_selection() {
        let state = SharedState::new("u1");
        state.set_selected_choice("A").await;
        assert_eq!(state.selected_choice().await.as_deref(), Some("A"));

        state.set_selected_choice("").await;
        assert!(state.selected_choice().await.is_none());
    }

    #[tokio::test]
    async fn session_id_is_stable() {
        let state = SharedState::new("u1");
        let id = state.session_id().to_string();
        assert!(id.starts_with("session_"));
        assert_eq!(state.session_id(), id);
    }
}
