//! Shared test fixtures: a scripted backend that records every call, and a
//! recording notebook host.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use tutorkit_common::protocol::{
    ChatRequest, ChatResponse, FillBlankRequest, GoOnRequest, LogCodeExecutionRequest,
    SegmentsRequest, UpdateBktRequest, UpdateSeqRequest,
};
use tutorkit_common::types::Segment;
use tutorkit_core::gateway::{GatewayError, TutorBackend};
use tutorkit_core::notebook::{CellSnapshot, NotebookError, NotebookHost, PlaybackClock};
use tutorkit_core::{ConversationLog, SessionEngine, SharedState};

/// Every request the scripted backend received, in arrival order.
#[derive(Debug, Clone)]
pub enum BackendCall {
    Segments(SegmentsRequest),
    Chat(ChatRequest),
    GoOn(GoOnRequest),
    UpdateSeq(UpdateSeqRequest),
    UpdateBkt(UpdateBktRequest),
    FillBlank(FillBlankRequest),
    LogCodeExecution(LogCodeExecutionRequest),
}

/// In-memory backend with canned answers.
pub struct ScriptedBackend {
    pub calls: Mutex<Vec<BackendCall>>,
    pub segments: Mutex<Vec<Segment>>,
    pub fail_segments: Mutex<bool>,
    /// Replies consumed in order; an empty queue falls back to a plain
    /// acknowledgement that expects a learner response
    pub chat_replies: Mutex<VecDeque<ChatResponse>>,
    pub fail_chat: Mutex<bool>,
    pub go_on_answer: Mutex<bool>,
    pub fail_go_on: Mutex<bool>,
    pub fill_choices: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(segments: Vec<Segment>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            segments: Mutex::new(segments),
            fail_segments: Mutex::new(false),
            chat_replies: Mutex::new(VecDeque::new()),
            fail_chat: Mutex::new(false),
            go_on_answer: Mutex::new(false),
            fail_go_on: Mutex::new(false),
            fill_choices: Mutex::new(vec!["dplyr".to_string(), "ggplot2".to_string()]),
        })
    }

    pub fn queue_chat_reply(&self, message: &str, interaction: &str, need_response: bool) {
        self.chat_replies.lock().unwrap().push_back(ChatResponse {
            message: message.to_string(),
            interaction: interaction.to_string(),
            need_response,
        });
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Chat(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn go_on_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::GoOn(_)))
            .count()
    }

    pub fn segments_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::Segments(_)))
            .count()
    }

    pub fn update_bkt_requests(&self) -> Vec<UpdateBktRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::UpdateBkt(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn update_seq_requests(&self) -> Vec<UpdateSeqRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::UpdateSeq(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn log_code_execution_requests(&self) -> Vec<LogCodeExecutionRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::LogCodeExecution(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TutorBackend for ScriptedBackend {
    async fn segments(&self, req: SegmentsRequest) -> Result<Vec<Segment>, GatewayError> {
        self.record(BackendCall::Segments(req));
        if *self.fail_segments.lock().unwrap() {
            return Err(GatewayError::Network("scripted failure".to_string()));
        }
        Ok(self.segments.lock().unwrap().clone())
    }

    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.record(BackendCall::Chat(req));
        if *self.fail_chat.lock().unwrap() {
            return Err(GatewayError::Network("scripted failure".to_string()));
        }
        Ok(self
            .chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ChatResponse {
                message: "Sounds good, keep going!".to_string(),
                interaction: "plain text".to_string(),
                need_response: true,
            }))
    }

    async fn go_on(&self, req: GoOnRequest) -> Result<bool, GatewayError> {
        self.record(BackendCall::GoOn(req));
        if *self.fail_go_on.lock().unwrap() {
            return Err(GatewayError::Api(500, "scripted failure".to_string()));
        }
        Ok(*self.go_on_answer.lock().unwrap())
    }

    async fn update_seq(&self, req: UpdateSeqRequest) -> Result<(), GatewayError> {
        self.record(BackendCall::UpdateSeq(req));
        Ok(())
    }

    async fn update_bkt(&self, req: UpdateBktRequest) -> Result<(), GatewayError> {
        self.record(BackendCall::UpdateBkt(req));
        Ok(())
    }

    async fn fill_blank(&self, req: FillBlankRequest) -> Result<Vec<String>, GatewayError> {
        self.record(BackendCall::FillBlank(req));
        Ok(self.fill_choices.lock().unwrap().clone())
    }

    async fn log_code_execution(
        &self,
        req: LogCodeExecutionRequest,
    ) -> Result<(), GatewayError> {
        self.record(BackendCall::LogCodeExecution(req));
        Ok(())
    }
}

/// Notebook host that records insertions.
pub struct RecordingNotebook {
    pub active: Mutex<bool>,
    pub inserted: Mutex<Vec<String>>,
}

impl RecordingNotebook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(true),
            inserted: Mutex::new(Vec::new()),
        })
    }

    pub fn set_active(&self, active: bool) {
        *self.active.lock().unwrap() = active;
    }

    pub fn inserted(&self) -> Vec<String> {
        self.inserted.lock().unwrap().clone()
    }
}

impl NotebookHost for RecordingNotebook {
    fn snapshot(&self) -> Option<Vec<CellSnapshot>> {
        if !*self.active.lock().unwrap() {
            return None;
        }
        Some(vec![CellSnapshot {
            cell_type: "code".to_string(),
            source: "df <- read.csv('data.csv')".to_string(),
            output_type: None,
        }])
    }

    fn insert_cell_below(&self, source: &str) -> Result<(), NotebookError> {
        if !*self.active.lock().unwrap() {
            return Err(NotebookError::NoActiveNotebook);
        }
        self.inserted.lock().unwrap().push(source.to_string());
        Ok(())
    }

    fn kernel_name(&self) -> Option<String> {
        Some("ir".to_string())
    }
}

/// Fixed playback clock.
pub struct FixedClock(pub u64);

impl PlaybackClock for FixedClock {
    fn current_time_secs(&self) -> Option<u64> {
        Some(self.0)
    }
}

/// One wired-up engine with its collaborators exposed for assertions.
pub struct Fixture {
    pub engine: SessionEngine,
    pub state: Arc<SharedState>,
    pub log: Arc<ConversationLog>,
    pub backend: Arc<ScriptedBackend>,
    pub notebook: Arc<RecordingNotebook>,
}

pub fn fixture(segments: Vec<Segment>) -> Fixture {
    let state = Arc::new(SharedState::new("learner-1"));
    let log = Arc::new(ConversationLog::new());
    let backend = ScriptedBackend::new(segments);
    let notebook = RecordingNotebook::new();
    let engine = SessionEngine::new(
        Arc::clone(&state),
        Arc::clone(&log),
        backend.clone(),
        notebook.clone(),
        Arc::new(FixedClock(42)),
    );
    Fixture {
        engine,
        state,
        log,
        backend,
        notebook,
    }
}

pub fn segment(start: f64, end: f64, category: &str) -> Segment {
    Segment {
        start,
        end,
        category: category.to_string(),
    }
}

/// Intro + EDA, the smallest segmentation exercising both gate rules.
pub fn two_segments() -> Vec<Segment> {
    vec![
        segment(0.0, 30.0, "Introduction"),
        segment(30.0, 90.0, "EDA"),
    ]
}

pub fn three_segments() -> Vec<Segment> {
    vec![
        segment(0.0, 30.0, "Introduction"),
        segment(30.0, 90.0, "EDA"),
        segment(90.0, 150.0, "Visualization"),
    ]
}

/// Process everything the engine enqueued for itself (auto-continues and
/// deferred sends), including work those commands enqueue in turn.
pub async fn drain(engine: &SessionEngine) {
    while engine.tick().await {}
}

/// Give fire-and-forget backend calls a chance to land.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}
