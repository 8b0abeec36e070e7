//! Cell-execution reconciliation
//!
//! A failed execution is not a system fault: the traceback becomes the next
//! learner question so the tutor can react to it. Every execution, failed or
//! not, is audit-logged for knowledge tracking.

use std::sync::Arc;

use tracing::warn;

use tutorkit_common::protocol::{GoOnRequest, LogCodeExecutionRequest};

use crate::notebook::CellOutput;

use super::SessionEngine;

impl SessionEngine {
    pub(crate) async fn handle_cell_executed(
        &self,
        source: String,
        cell_type: String,
        outputs: Vec<CellOutput>,
    ) {
        let mut status = "success";
        let mut output_text = None;
        let mut error_text = None;

        match outputs.first() {
            Some(CellOutput::Error { traceback, .. }) => {
                status = "error";
                let text = traceback.join("\n");
                error_text = Some(text.clone());
                self.state.set_pending_code_error(text).await;
                self.state.set_awaiting_dispatch().await;
            }
            Some(first @ (CellOutput::Stream { .. } | CellOutput::ExecuteResult { .. })) => {
                output_text = serde_json::to_string(first).ok();
            }
            _ => {}
        }

        let video_id = self.state.video_id().await.unwrap_or_default();
        let segment_index = self.state.segment_index().await;

        // Audit log, independent of the error path; never blocks.
        let backend = Arc::clone(&self.backend);
        let req = LogCodeExecutionRequest {
            user_id: self.state.user_id().await,
            session_id: self.state.session_id().to_string(),
            code: source,
            cell_type,
            status: status.to_string(),
            output: output_text,
            error: error_text,
            video_id: video_id.clone(),
            segment_index,
        };
        tokio::spawn(async move {
            if let Err(e) = backend.log_code_execution(req).await {
                warn!(error = %e, "failed to log code execution");
            }
        });

        // Running code can earn the learner the right to move on.
        if !video_id.is_empty() && !self.state.may_advance().await {
            let req = GoOnRequest {
                video_id,
                segment_index,
            };
            match self.backend.go_on(req).await {
                Ok(true) => self.set_gate(true).await,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "advance gate check failed, gate unchanged"),
            }
        }

        self.dispatch_deferred().await;
    }
}
