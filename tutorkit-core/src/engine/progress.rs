//! Segment progression and interaction completion
//!
//! Video-end auto-continues, the explicit "go on" transition, and
//! fill-in-blanks completion.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use tutorkit_common::conversation::{Direction, Interaction, TurnId};
use tutorkit_common::events::SessionEvent;
use tutorkit_common::protocol::{UpdateBktRequest, UpdateSeqRequest};
use tutorkit_common::types::{SegmentRef, CONCLUSION, INTRODUCTION, SELF_EXPLORATION};

use crate::codeblock;
use crate::events::SessionCommand;
use crate::log::TurnDraft;
use crate::policy::{self, GoOnOutcome};
use crate::prompts;

use super::SessionEngine;

impl SessionEngine {
    /// End of playback for the active segment's rendering of the player.
    ///
    /// Fires one auto-continue per rendering; replays and duplicate player
    /// callbacks are swallowed until the next go-on re-arms the flag.
    pub(crate) async fn handle_video_end(&self, category: String) {
        if category == INTRODUCTION {
            return;
        }
        if self.state.video_end_sent().await {
            debug!("video-end auto-continue already sent for this segment");
            return;
        }
        self.state.set_video_end_sent(true).await;
        self.enqueue(SessionCommand::LearnerSend {
            text: String::new(),
        });
    }

    /// User-initiated advance to the next chapter.
    pub(crate) async fn handle_go_on(&self) {
        let video_id = match self.state.video_id().await {
            Some(v) => v,
            None => {
                debug!("go-on ignored, no video selected");
                return;
            }
        };
        if !self.state.may_advance().await {
            debug!("go-on ignored, gate closed");
            return;
        }
        if self.state.typing().await {
            debug!("go-on ignored, request in flight");
            return;
        }

        self.set_gate(false).await;
        self.state.set_video_end_sent(false).await;

        let segments = self.state.segments().await;
        let index = self.state.segment_index().await;

        match policy::go_on_outcome(index, &segments) {
            GoOnOutcome::NextSegment { index: next, segment } => {
                self.state.advance_segment_index(next).await;

                let backend = Arc::clone(&self.backend);
                let req = UpdateSeqRequest {
                    video_id: video_id.clone(),
                    segment_index: next,
                    category: segment.category.clone(),
                    user_id: self.state.user_id().await,
                    session_id: self.state.session_id().to_string(),
                };
                tokio::spawn(async move {
                    if let Err(e) = backend.update_seq(req).await {
                        warn!(error = %e, "progress-sequence update failed");
                    }
                });

                let sent_time = format!("{}", segment.start);
                self.append(
                    TurnDraft::message(
                        Direction::Incoming,
                        prompts::TUTOR_NAME,
                        prompts::NEXT_SEGMENT,
                        sent_time,
                    )
                    .with_interaction(None)
                    .with_segment(Some(SegmentRef::indexed(&video_id, &segment))),
                )
                .await;
            }
            GoOnOutcome::SelfExploration { index: next } => {
                self.state.advance_segment_index(next).await;
                self.append(
                    TurnDraft::message(
                        Direction::Incoming,
                        prompts::TUTOR_NAME,
                        prompts::SELF_EXPLORATION_PROMPT,
                        "just now",
                    )
                    .with_segment(Some(SegmentRef::synthetic(SELF_EXPLORATION))),
                )
                .await;
            }
            GoOnOutcome::Conclusion => {
                self.append(
                    TurnDraft::message(
                        Direction::Incoming,
                        prompts::TUTOR_NAME,
                        prompts::CONCLUSION_PROMPT,
                        "just now",
                    )
                    .with_segment(Some(SegmentRef::synthetic(CONCLUSION))),
                )
                .await;
            }
        }
    }

    /// Learner edited the code of a fill-in-blanks turn.
    ///
    /// The completion side effect (knowledge update + auto-continue) fires
    /// at most once per turn id, even if the code is edited back to a
    /// blank-free shape repeatedly.
    pub(crate) async fn handle_blanks_edited(&self, turn_id: TurnId, code: String) {
        let turn = match self.log.get(turn_id).await {
            Some(t) => t,
            None => {
                warn!(%turn_id, "blank edit for unknown turn");
                return;
            }
        };
        if turn.interaction != Some(Interaction::FillInBlanks) {
            warn!(%turn_id, "blank edit for a non-fill-in-blanks turn");
            return;
        }

        match self.log.update_code(turn_id, code.clone()).await {
            Ok(_) => self.state.broadcast(SessionEvent::TurnCodeUpdated {
                turn_id,
                code: code.clone(),
                timestamp: Utc::now(),
            }),
            Err(e) => {
                warn!(error = %e, "rejecting blank edit");
                return;
            }
        }

        if codeblock::has_blanks(&code) {
            return;
        }

        {
            let mut checked = self
                .checked_blanks
                .lock()
                .expect("checked-blanks mutex poisoned");
            if !checked.insert(turn_id) {
                debug!(%turn_id, "completion side effect already recorded");
                return;
            }
        }

        let initial_code = self
            .fill_initial
            .lock()
            .expect("fill-initial mutex poisoned")
            .get(&turn_id)
            .cloned()
            .unwrap_or_default();

        let backend = Arc::clone(&self.backend);
        let req = UpdateBktRequest {
            initial_code,
            filled_code: code,
            selected_choice: String::new(),
            video_id: self.state.video_id().await.unwrap_or_default(),
            segment_index: self.state.segment_index().await,
            user_id: self.state.user_id().await,
            session_id: self.state.session_id().to_string(),
        };
        tokio::spawn(async move {
            if let Err(e) = backend.update_bkt(req).await {
                warn!(error = %e, "knowledge-state update failed");
            }
        });

        self.enqueue(SessionCommand::LearnerSend {
            text: String::new(),
        });
    }
}
