//! Notebook and player collaborator interfaces
//!
//! The host notebook and the video player are external collaborators; the
//! engine only needs a snapshot of cells for chat context, the ability to
//! insert a cell below the active one, the kernel type name, and the current
//! playback second for sent-time labels. Hosts adapt their widget APIs to
//! these traits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the notebook collaborator.
#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("no active notebook")]
    NoActiveNotebook,

    #[error("cell insertion failed: {0}")]
    InsertFailed(String),
}

/// Per-cell slice of the notebook snapshot sent with chat turns: the cell
/// kind, its source, and the type of its first output entry if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub cell_type: String,
    pub source: String,
    pub output_type: Option<String>,
}

/// One output entry of an executed cell, tagged the way the notebook
/// protocol tags them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum CellOutput {
    Error {
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
    Stream {
        name: String,
        text: serde_json::Value,
    },
    ExecuteResult {
        data: serde_json::Value,
    },
    DisplayData {
        data: serde_json::Value,
    },
}

/// Handle to the host notebook.
pub trait NotebookHost: Send + Sync {
    /// Snapshot of all cells, or `None` when no notebook is active.
    fn snapshot(&self) -> Option<Vec<CellSnapshot>>;

    /// Insert a new cell below the active one and set its source.
    fn insert_cell_below(&self, source: &str) -> Result<(), NotebookError>;

    /// Kernel type name, when a kernel is running.
    fn kernel_name(&self) -> Option<String>;
}

/// Handle to the video player's playback clock.
pub trait PlaybackClock: Send + Sync {
    /// Current playback position in whole seconds, when a player exists.
    fn current_time_secs(&self) -> Option<u64>;
}

/// Notebook stub for headless use: no cells, no kernel, insertion refused.
pub struct NullNotebook;

impl NotebookHost for NullNotebook {
    fn snapshot(&self) -> Option<Vec<CellSnapshot>> {
        None
    }

    fn insert_cell_below(&self, _source: &str) -> Result<(), NotebookError> {
        Err(NotebookError::NoActiveNotebook)
    }

    fn kernel_name(&self) -> Option<String> {
        None
    }
}

/// Clock stub for headless use.
pub struct NullClock;

impl PlaybackClock for NullClock {
    fn current_time_secs(&self) -> Option<u64> {
        None
    }
}
