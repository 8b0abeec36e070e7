//! Backend gateway
//!
//! Typed façade over the tutoring backend's remote operations. The engine
//! talks to [`TutorBackend`] only; [`HttpGateway`] is the production
//! implementation, and tests substitute scripted backends.
//!
//! Every operation is best-effort from the session's point of view: callers
//! log failures and continue from their last good state.

mod http;

pub use http::{HttpGateway, DEFAULT_TIMEOUT};

use async_trait::async_trait;
use thiserror::Error;

use tutorkit_common::protocol::{
    ChatRequest, ChatResponse, FillBlankRequest, GoOnRequest, LogCodeExecutionRequest,
    SegmentsRequest, UpdateBktRequest, UpdateSeqRequest,
};
use tutorkit_common::types::Segment;

/// Gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned {0}: {1}")]
    Api(u16, String),

    /// Response arrived but did not match the operation's expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The five-plus-two remote operations of the tutoring backend.
#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// Fetch the segmentation of a video.
    async fn segments(&self, req: SegmentsRequest) -> Result<Vec<Segment>, GatewayError>;

    /// Run one tutoring turn.
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, GatewayError>;

    /// Advance-gate check; true means the learner may move on.
    async fn go_on(&self, req: GoOnRequest) -> Result<bool, GatewayError>;

    /// Persist the learner's progress sequence.
    async fn update_seq(&self, req: UpdateSeqRequest) -> Result<(), GatewayError>;

    /// Update the backend's mastery model with a learner action.
    async fn update_bkt(&self, req: UpdateBktRequest) -> Result<(), GatewayError>;

    /// Candidate answers for the current segment's blanks.
    async fn fill_blank(&self, req: FillBlankRequest) -> Result<Vec<String>, GatewayError>;

    /// Audit-log a notebook cell execution.
    async fn log_code_execution(
        &self,
        req: LogCodeExecutionRequest,
    ) -> Result<(), GatewayError>;
}
