//! Session engine - lifecycle and event reconciliation
//!
//! **Responsibilities:**
//! - Single authority over session state and the conversation log
//! - Command loop consuming learner sends, cell executions and video-end
//!   completions, in arrival order, one at a time
//! - Backend call sequencing per event, with fire-and-forget bookkeeping
//!   calls that never block the flow
//!
//! Handlers run to completion before the next command dequeues, so state
//! reads within a handler are consistent. Auto-continue re-sends go back
//! through the command channel rather than recursing, letting the current
//! turn's state changes settle first.

mod execution;
mod progress;
mod send;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use tutorkit_common::conversation::{Direction, Turn, TurnId};
use tutorkit_common::events::SessionEvent;
use tutorkit_common::types::SessionPhase;

use crate::events::SessionCommand;
use crate::gateway::TutorBackend;
use crate::log::{ConversationLog, TurnDraft};
use crate::notebook::{NotebookHost, PlaybackClock};
use crate::prompts;
use crate::state::SharedState;

/// How long the host should flash a freshly inserted code cell.
pub(crate) const CELL_FLASH_MS: u64 = 2000;

/// The session engine.
///
/// Owns the command channel; hosts keep a [`SessionCommand`] sender and a
/// [`SessionEvent`] subscription and never touch session state directly.
pub struct SessionEngine {
    pub(crate) state: Arc<SharedState>,
    pub(crate) log: Arc<ConversationLog>,
    pub(crate) backend: Arc<dyn TutorBackend>,
    pub(crate) notebook: Arc<dyn NotebookHost>,
    pub(crate) clock: Arc<dyn PlaybackClock>,

    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
    /// Wrapped in Option so `run` can take it once
    cmd_rx: Mutex<Option<mpsc::UnboundedReceiver<SessionCommand>>>,

    /// Initial code of each fill-in-blanks turn, for knowledge updates
    pub(crate) fill_initial: StdMutex<HashMap<TurnId, String>>,
    /// Fill-in-blanks turns whose completion side effect already fired
    pub(crate) checked_blanks: StdMutex<HashSet<TurnId>>,
    /// Blank-answer candidates already fetched, keyed by segment index
    pub(crate) fill_choices: StdMutex<HashMap<usize, Vec<String>>>,
}

impl SessionEngine {
    pub fn new(
        state: Arc<SharedState>,
        log: Arc<ConversationLog>,
        backend: Arc<dyn TutorBackend>,
        notebook: Arc<dyn NotebookHost>,
        clock: Arc<dyn PlaybackClock>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        Self {
            state,
            log,
            backend,
            notebook,
            clock,
            cmd_tx,
            cmd_rx: Mutex::new(Some(cmd_rx)),
            fill_initial: StdMutex::new(HashMap::new()),
            checked_blanks: StdMutex::new(HashSet::new()),
            fill_choices: StdMutex::new(HashMap::new()),
        }
    }

    /// Sender half of the command channel, for hosts and adapters.
    pub fn command_sender(&self) -> mpsc::UnboundedSender<SessionCommand> {
        self.cmd_tx.clone()
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn log(&self) -> &Arc<ConversationLog> {
        &self.log
    }

    /// Prime the session: pick up the kernel type from the notebook host and
    /// post the scripted welcome turn.
    pub async fn start(&self) {
        if let Some(kernel) = self.notebook.kernel_name() {
            self.state.set_kernel_type(kernel).await;
        }
        self.append(TurnDraft::message(
            Direction::Incoming,
            prompts::TUTOR_NAME,
            prompts::WELCOME,
            "0 second",
        ))
        .await;
    }

    /// Consume the command channel until every sender is dropped.
    pub async fn run(&self) {
        let mut rx = match self.cmd_rx.lock().await.take() {
            Some(rx) => rx,
            None => {
                warn!("engine command loop already running");
                return;
            }
        };
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd).await;
        }
        debug!("command channel closed, engine loop exiting");
    }

    /// Process a single queued command, if any. Returns whether one ran.
    ///
    /// Lets callers that drive the engine directly (instead of through
    /// [`run`](Self::run)) flush self-enqueued work such as auto-continues.
    pub async fn tick(&self) -> bool {
        let cmd = {
            let mut guard = self.cmd_rx.lock().await;
            match guard.as_mut() {
                Some(rx) => rx.try_recv().ok(),
                None => None,
            }
        };
        match cmd {
            Some(cmd) => {
                self.handle(cmd).await;
                true
            }
            None => false,
        }
    }

    /// Apply one command.
    pub async fn handle(&self, cmd: SessionCommand) {
        debug!(?cmd, "handling session command");
        match cmd {
            SessionCommand::LearnerSend { text } => self.handle_send(text).await,
            SessionCommand::ExplainMore { text } => {
                self.state.set_explain_more(true).await;
                self.handle_send(format!("{}{text}", prompts::EXPLAIN_MORE_PREFIX))
                    .await;
            }
            SessionCommand::CellExecuted {
                source,
                cell_type,
                outputs,
            } => self.handle_cell_executed(source, cell_type, outputs).await,
            SessionCommand::VideoEnded { category } => self.handle_video_end(category).await,
            SessionCommand::GoOn => self.handle_go_on().await,
            SessionCommand::ChoiceSelected { choice } => {
                self.state.set_selected_choice(choice).await;
            }
            SessionCommand::BlanksEdited { turn_id, code } => {
                self.handle_blanks_edited(turn_id, code).await;
            }
        }
    }

    // ----- shared helpers -----

    pub(crate) fn enqueue(&self, cmd: SessionCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("command channel closed, dropping enqueued command");
        }
    }

    /// Append a turn and announce it.
    pub(crate) async fn append(&self, draft: TurnDraft) -> Turn {
        let turn = self.log.append(draft).await;
        self.state.broadcast(SessionEvent::TurnAppended {
            turn: turn.clone(),
            timestamp: Utc::now(),
        });
        turn
    }

    pub(crate) async fn set_typing(&self, typing: bool) {
        self.state.set_typing(typing).await;
        self.state.broadcast(SessionEvent::TypingChanged {
            typing,
            timestamp: Utc::now(),
        });
    }

    pub(crate) async fn set_gate(&self, may_advance: bool) {
        self.state.set_may_advance(may_advance).await;
        self.state.broadcast(SessionEvent::AdvanceGateChanged {
            may_advance,
            timestamp: Utc::now(),
        });
    }

    pub(crate) async fn set_phase(&self, phase: SessionPhase) {
        self.state.set_phase(phase).await;
        self.state.broadcast(SessionEvent::PhaseChanged {
            phase,
            timestamp: Utc::now(),
        });
    }

    /// Fire the deferred send once both halves are in place: a video id and
    /// a queued request to send. Carries the pending execution error as the
    /// question when one exists, else an empty auto-continue.
    pub(crate) async fn dispatch_deferred(&self) {
        if self.state.video_id().await.is_none() {
            return;
        }
        if !self.state.take_awaiting_dispatch().await {
            return;
        }
        let text = self.state.pending_code_error().await.unwrap_or_default();
        self.enqueue(SessionCommand::LearnerSend { text });
    }
}
