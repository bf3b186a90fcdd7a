//! Serializable status views handed to the UI layer.

use serde::{Deserialize, Serialize};

use crate::core::{
    BatchReport, BatchSummary, JobStatus, LoadState, RenderHint, TargetId, UploadJob,
    VisibilityLoader,
};

/// Per-job status row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusView {
    /// Position in the batch input.
    pub index: usize,
    /// Original file name.
    pub file_name: String,
    /// Current status.
    pub status: JobStatus,
    /// Public uri once stored.
    pub uri: Option<String>,
    /// Error message once failed.
    pub error: Option<String>,
}

impl From<&UploadJob> for JobStatusView {
    fn from(job: &UploadJob) -> Self {
        Self {
            index: job.index,
            file_name: job.file_name.clone(),
            status: job.status,
            uri: job.result_uri.clone(),
            error: job.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Batch status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatusResponse {
    /// Batch identifier.
    pub batch_id: String,
    /// Done/failed counts.
    pub summary: BatchSummary,
    /// Jobs in input order.
    pub jobs: Vec<JobStatusView>,
}

impl From<&BatchReport> for BatchStatusResponse {
    fn from(report: &BatchReport) -> Self {
        Self {
            batch_id: report.batch_id.clone(),
            summary: report.summary(),
            jobs: report.jobs.iter().map(JobStatusView::from).collect(),
        }
    }
}

/// Load status response for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStatusResponse {
    /// Observed element.
    pub target: TargetId,
    /// Current state.
    pub state: LoadState,
    /// What to draw.
    pub hint: RenderHint,
    /// Fetch error once failed.
    pub error: Option<String>,
}

/// Snapshot a loader for the UI layer.
pub fn load_status<S>(loader: &VisibilityLoader<S>) -> LoadStatusResponse {
    LoadStatusResponse {
        target: loader.target().id,
        state: loader.state(),
        hint: loader.render_hint(),
        error: loader.error().map(|e| e.to_string()),
    }
}
