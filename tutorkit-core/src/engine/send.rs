//! Learner-send reconciliation
//!
//! The send path has two faces: the very first non-empty send selects the
//! video and fetches its segmentation, every later send is a tutoring turn
//! against the backend.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use tutorkit_common::conversation::{Direction, Interaction};
use tutorkit_common::events::SessionEvent;
use tutorkit_common::protocol::{
    ChatRequest, FillBlankRequest, GoOnRequest, SegmentsRequest, UpdateBktRequest,
};
use tutorkit_common::types::{SegmentRef, SessionPhase};

use crate::codeblock;
use crate::events::SessionCommand;
use crate::log::TurnDraft;
use crate::policy::{self, AdvanceRule};
use crate::prompts;

use super::{SessionEngine, CELL_FLASH_MS};

impl SessionEngine {
    pub(crate) async fn handle_send(&self, raw: String) {
        let question = codeblock::strip_markup(&raw);

        let pending_error = self.state.pending_code_error().await;
        let explain_more = self.state.explain_more().await;
        if pending_error.is_none() && !explain_more {
            self.append(TurnDraft::message(
                Direction::Outgoing,
                prompts::LEARNER_NAME,
                question.clone(),
                "just now",
            ))
            .await;
        } else {
            // The question is already visible to the learner (a failed cell's
            // traceback, or the tutor turn being expanded on); logging it
            // again would duplicate it.
            self.state.clear_pending_code_error().await;
            self.state.set_explain_more(false).await;
        }

        match self.state.video_id().await {
            None => self.begin_session(question).await,
            Some(video_id) => self.steady_send(video_id, question).await,
        }
    }

    /// First-turn branch: the text is a video selector, not a question.
    async fn begin_session(&self, question: String) {
        let video_id = question.trim().to_string();
        if video_id.is_empty() {
            debug!("no video selected yet, ignoring empty send");
            return;
        }

        self.set_typing(true).await;
        self.set_gate(true).await;
        self.set_phase(SessionPhase::FetchingSegments).await;
        if !self.state.set_video_id(&video_id).await {
            warn!(video_id, "video already selected, keeping the first selection");
        }

        let req = SegmentsRequest {
            video_id: video_id.clone(),
            user_id: self.state.user_id().await,
            session_id: self.state.session_id().to_string(),
        };
        match self.backend.segments(req).await {
            Ok(segments) => {
                self.state.set_segments(segments.clone()).await;
                self.state.broadcast(SessionEvent::SegmentsLoaded {
                    video_id: video_id.clone(),
                    segments: segments.clone(),
                    timestamp: Utc::now(),
                });
                let anchor = segments.first().map(|s| SegmentRef::indexed(&video_id, s));
                self.append(
                    TurnDraft::message(
                        Direction::Incoming,
                        prompts::TUTOR_NAME,
                        prompts::ORIENTATION,
                        "just now",
                    )
                    .with_segment(anchor),
                )
                .await;
            }
            Err(e) => {
                // The session limps on without segments; category resolution
                // falls through to the synthetic windows.
                error!(error = %e, video_id, "segmentation fetch failed");
            }
        }
        self.set_phase(SessionPhase::InSession).await;
        self.set_typing(false).await;

        self.dispatch_deferred().await;
    }

    /// Steady-state branch: one full tutoring turn.
    async fn steady_send(&self, video_id: String, question: String) {
        self.set_typing(true).await;

        let segments = self.state.segments().await;
        let segment_index = self.state.segment_index().await;
        let category = policy::resolve_category(segment_index, &segments);
        let selected_choice = self.state.selected_choice().await.unwrap_or_default();

        // A pending multiple-choice selection feeds the mastery model;
        // never blocks the turn.
        if !selected_choice.is_empty() {
            let backend = Arc::clone(&self.backend);
            let req = UpdateBktRequest {
                initial_code: String::new(),
                filled_code: String::new(),
                selected_choice: selected_choice.clone(),
                video_id: video_id.clone(),
                segment_index,
                user_id: self.state.user_id().await,
                session_id: self.state.session_id().to_string(),
            };
            tokio::spawn(async move {
                if let Err(e) = backend.update_bkt(req).await {
                    warn!(error = %e, "knowledge-state update failed");
                }
            });
        }

        match policy::advance_rule(&category) {
            AdvanceRule::Always => self.set_gate(true).await,
            AdvanceRule::Never => self.set_gate(false).await,
            AdvanceRule::AskBackend => {
                if !self.state.may_advance().await {
                    let req = GoOnRequest {
                        video_id: video_id.clone(),
                        segment_index,
                    };
                    match self.backend.go_on(req).await {
                        Ok(allowed) => self.set_gate(allowed).await,
                        Err(e) => {
                            warn!(error = %e, "advance gate check failed, gate unchanged")
                        }
                    }
                }
            }
        }

        let notebook = serde_json::to_string(&self.notebook.snapshot()).unwrap_or_else(|e| {
            warn!(error = %e, "notebook snapshot failed to serialize");
            "null".to_string()
        });

        let req = ChatRequest {
            notebook,
            question,
            video_id: video_id.clone(),
            category,
            segment_index,
            kernel_type: self.state.kernel_type().await,
            selected_choice,
            user_id: self.state.user_id().await,
            session_id: self.state.session_id().to_string(),
        };
        match self.backend.chat(req).await {
            Ok(reply) => {
                let (prose, code) = codeblock::split_reply(&reply.message);
                let interaction = Interaction::from_tag(&reply.interaction);

                if interaction == Interaction::ShowCode {
                    if let Some(code) = code.as_deref() {
                        match self.notebook.insert_cell_below(code) {
                            Ok(()) => self.state.broadcast(SessionEvent::CodeCellInserted {
                                code: code.to_string(),
                                flash_ms: CELL_FLASH_MS,
                                timestamp: Utc::now(),
                            }),
                            Err(e) => {
                                warn!(error = %e, "cell insertion failed, code renders inline")
                            }
                        }
                    }
                }

                let sent_time = match self.clock.current_time_secs() {
                    Some(secs) => format!("{secs} seconds"),
                    None => "0 seconds".to_string(),
                };
                let turn = self
                    .append(
                        TurnDraft::message(
                            Direction::Incoming,
                            prompts::TUTOR_NAME,
                            prose,
                            sent_time,
                        )
                        .with_interaction(Some(interaction))
                        .with_code(code.clone()),
                    )
                    .await;

                if interaction == Interaction::FillInBlanks {
                    if let Some(code) = code {
                        self.fill_initial
                            .lock()
                            .expect("fill-initial mutex poisoned")
                            .insert(turn.id, code);
                        self.fetch_fill_choices(video_id, segment_index).await;
                    }
                }

                self.set_typing(false).await;
                self.state.clear_selected_choice().await;

                if !reply.need_response {
                    // The tutor isn't waiting on the learner; ask for its
                    // next turn once this one has settled.
                    self.enqueue(SessionCommand::LearnerSend {
                        text: String::new(),
                    });
                }
            }
            Err(e) => {
                error!(error = %e, "chat turn failed");
                self.set_typing(false).await;
            }
        }
    }

    /// Candidate answers for the segment's blanks, fetched once per segment.
    async fn fetch_fill_choices(&self, video_id: String, segment_index: usize) {
        let cached = self
            .fill_choices
            .lock()
            .expect("fill-choices mutex poisoned")
            .get(&segment_index)
            .cloned();
        if let Some(choices) = cached {
            self.state.broadcast(SessionEvent::FillChoicesAvailable {
                segment_index,
                choices,
                timestamp: Utc::now(),
            });
            return;
        }

        let req = FillBlankRequest {
            video_id,
            segment_index,
        };
        match self.backend.fill_blank(req).await {
            Ok(choices) => {
                self.fill_choices
                    .lock()
                    .expect("fill-choices mutex poisoned")
                    .insert(segment_index, choices.clone());
                self.state.broadcast(SessionEvent::FillChoicesAvailable {
                    segment_index,
                    choices,
                    timestamp: Utc::now(),
                });
            }
            // Degrades to no suggestions; the blanks stay editable by hand.
            Err(e) => warn!(error = %e, segment_index, "fill-blank choices unavailable"),
        }
    }
}
