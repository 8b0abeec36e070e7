//! Error types for the orchestration core

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::notebook::NotebookError;

/// Result type for orchestration-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Orchestration-core errors.
///
/// Nothing here is fatal to a session: the engine logs these and continues
/// from its last good state.
#[derive(Error, Debug)]
pub enum Error {
    /// Backend gateway operation failed
    #[error("backend error: {0}")]
    Backend(#[from] GatewayError),

    /// Notebook collaborator refused an operation
    #[error("notebook error: {0}")]
    Notebook(#[from] NotebookError),

    /// Conversation log rejected a mutation
    #[error("conversation error: {0}")]
    Conversation(String),

    #[error(transparent)]
    Common(#[from] tutorkit_common::Error),
}
