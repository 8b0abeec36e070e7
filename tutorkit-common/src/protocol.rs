//! Backend wire protocol
//!
//! Typed request/response bodies for the tutoring backend. Every operation
//! is a POST with a JSON body; the backend's keys are camelCase, so requests
//! carry explicit renames rather than leaking Rust field names onto the wire.

use serde::{Deserialize, Serialize};

/// `segments`: initial segmentation fetch for a freshly selected video.
/// Response body: ordered `Vec<Segment>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentsRequest {
    pub video_id: String,
    pub user_id: String,
    pub session_id: String,
}

/// `chat`: main tutoring turn carrying the full session context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// JSON-serialized snapshot of the learner's notebook
    pub notebook: String,
    pub question: String,
    pub video_id: String,
    pub category: String,
    pub segment_index: usize,
    pub kernel_type: String,
    pub selected_choice: String,
    pub user_id: String,
    pub session_id: String,
}

/// Reply to a `chat` turn.
///
/// `need_response` tells the client whether the tutor expects the learner to
/// answer; when false the client immediately asks for the next tutor turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub interaction: String,
    #[serde(default = "default_need_response")]
    pub need_response: bool,
}

fn default_need_response() -> bool {
    true
}

/// `go_on`: advance-gate check. Response body: the JSON string `"yes"` or
/// `"no"`, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoOnRequest {
    pub video_id: String,
    pub segment_index: usize,
}

/// `update_seq`: progress-sequence persistence after a segment advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeqRequest {
    pub video_id: String,
    pub segment_index: usize,
    pub category: String,
    pub user_id: String,
    pub session_id: String,
}

/// `update_bkt`: knowledge-state update for a learner action: a chosen
/// multiple-choice answer, or a fill-in-blanks block the learner completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBktRequest {
    pub initial_code: String,
    pub filled_code: String,
    pub selected_choice: String,
    pub video_id: String,
    pub segment_index: usize,
    pub user_id: String,
    pub session_id: String,
}

/// `fill_blank`: candidate answers for the blanks of the current segment.
/// Response body: `Vec<String>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBlankRequest {
    pub video_id: String,
    pub segment_index: usize,
}

/// `log_code_execution`: execution audit entry for a notebook cell run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogCodeExecutionRequest {
    pub user_id: String,
    pub session_id: String,
    pub code: String,
    pub cell_type: String,
    pub status: String,
    pub output: Option<String>,
    pub error: Option<String>,
    pub video_id: String,
    pub segment_index: usize,
}
