//! Concurrent multi-file upload with per-job outcomes.
//!
//! A batch is one user selection or drop. Every file becomes an
//! [`UploadJob`] that is validated locally, keyed, and uploaded; all
//! validated jobs are in flight together and a failing job never cancels its
//! siblings. The report lists jobs in input order; the completion callback
//! fires in completion order.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::capability::ObjectStorage;
use crate::core::events::{build_event, EventKind, SharedEventSink};
use crate::core::{TransportError, UploadError, ValidationError};
use crate::util::clock::now_ms;
use crate::util::keys::generate_object_key;

/// A candidate file. Only `mime_type` and the byte length are inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name; its extension is kept in the storage key.
    pub name: String,
    /// MIME type reported by the picker or drop event.
    pub mime_type: String,
    /// Opaque payload.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Create a file.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Status of an upload job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, not inspected yet.
    Pending,
    /// Type and size checks running.
    Validating,
    /// Submitted to storage.
    Uploading,
    /// Stored; `result_uri` is set.
    Done,
    /// Rejected locally or by storage; `error` is set.
    Failed,
}

/// One file's journey through a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// Position of the file in the batch input.
    pub index: usize,
    /// Original file name.
    pub file_name: String,
    /// Storage key; `None` when the job never reached storage.
    pub generated_key: Option<String>,
    /// Current status.
    pub status: JobStatus,
    /// Public uri once `Done`.
    pub result_uri: Option<String>,
    /// Failure reason once `Failed`.
    pub error: Option<UploadError>,
}

impl UploadJob {
    fn new(index: usize, file_name: String) -> Self {
        Self {
            index,
            file_name,
            generated_key: None,
            status: JobStatus::Pending,
            result_uri: None,
            error: None,
        }
    }

    /// User-facing error string, if the job failed.
    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|err| format!("{}: {err}", self.file_name))
    }
}

/// Limits applied to every batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Accepted MIME prefix (e.g. `image/`); empty accepts everything.
    pub accepted_mime_prefix: String,
    /// Per-file byte ceiling.
    pub max_bytes_per_file: u64,
    /// Cap on already-uploaded plus incoming files.
    pub max_count: usize,
    /// Optional cap on simultaneous storage calls; `None` overlaps every job.
    pub max_in_flight: Option<usize>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted_mime_prefix: "image/".into(),
            max_bytes_per_file: 5 * 1024 * 1024,
            max_count: 10,
            max_in_flight: None,
        }
    }
}

impl UploadPolicy {
    /// Check type and size of a single file.
    pub fn validate_file(&self, file: &UploadFile) -> Result<(), ValidationError> {
        let prefix = self.accepted_mime_prefix.to_ascii_lowercase();
        if !file.mime_type.to_ascii_lowercase().starts_with(&prefix) {
            return Err(ValidationError::UnsupportedType {
                expected_prefix: self.accepted_mime_prefix.clone(),
                actual: file.mime_type.clone(),
            });
        }
        if file.bytes.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if file.size() > self.max_bytes_per_file {
            return Err(ValidationError::FileTooLarge {
                size: file.size(),
                limit: self.max_bytes_per_file,
            });
        }
        Ok(())
    }

    /// Check the batch count cap.
    pub fn validate_count(
        &self,
        existing: usize,
        incoming: usize,
    ) -> Result<(), ValidationError> {
        if existing.saturating_add(incoming) > self.max_count {
            return Err(ValidationError::TooManyFiles {
                existing,
                incoming,
                limit: self.max_count,
            });
        }
        Ok(())
    }
}

/// Where generated keys live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadContext {
    /// Owner of the uploads (user, listing, ...).
    pub context_id: String,
    /// Grouping below the owner (e.g. `gallery`).
    pub category: String,
}

impl UploadContext {
    /// Create a context.
    pub fn new(context_id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            category: category.into(),
        }
    }
}

/// Passed to the completion callback for every stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedUpload {
    /// Position of the file in the batch input.
    pub index: usize,
    /// Storage key.
    pub key: String,
    /// Public uri.
    pub uri: String,
}

/// Done/failed counts of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Jobs in the batch.
    pub total: usize,
    /// Jobs that ended `Done`.
    pub done: usize,
    /// Jobs that ended `Failed`.
    pub failed: usize,
}

/// Final outcome of a batch, jobs in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Identifier used in progress events.
    pub batch_id: String,
    /// One job per input file.
    pub jobs: Vec<UploadJob>,
}

impl BatchReport {
    /// Done/failed counts.
    pub fn summary(&self) -> BatchSummary {
        let done = self.jobs.iter().filter(|j| j.status == JobStatus::Done).count();
        let failed = self.jobs.iter().filter(|j| j.status == JobStatus::Failed).count();
        BatchSummary {
            total: self.jobs.len(),
            done,
            failed,
        }
    }

    /// Jobs that were stored.
    pub fn completed(&self) -> impl Iterator<Item = &UploadJob> {
        self.jobs.iter().filter(|j| j.status == JobStatus::Done)
    }

    /// Jobs that failed, for either reason.
    pub fn failed(&self) -> impl Iterator<Item = &UploadJob> {
        self.jobs.iter().filter(|j| j.status == JobStatus::Failed)
    }

    /// User-facing error strings, in input order.
    pub fn error_messages(&self) -> Vec<String> {
        self.jobs.iter().filter_map(UploadJob::error_message).collect()
    }

    /// Whether every job was stored.
    pub fn all_succeeded(&self) -> bool {
        self.jobs.iter().all(|j| j.status == JobStatus::Done)
    }
}

/// Runs upload batches against an [`ObjectStorage`].
pub struct BatchUploader {
    storage: Arc<dyn ObjectStorage>,
    policy: UploadPolicy,
    events: Option<SharedEventSink>,
}

impl BatchUploader {
    /// Create an uploader.
    pub fn new(storage: Arc<dyn ObjectStorage>, policy: UploadPolicy) -> Self {
        Self {
            storage,
            policy,
            events: None,
        }
    }

    /// Attach an event sink.
    #[must_use]
    pub fn with_events(mut self, sink: SharedEventSink) -> Self {
        self.events = Some(sink);
        self
    }

    /// Limits applied to every batch.
    pub const fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Public uri for a stored key.
    pub fn public_url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }

    /// Validate, key and upload `files`.
    ///
    /// `already_uploaded` is the number of files the caller already tracks;
    /// if it plus `files.len()` exceeds `max_count` the whole batch is
    /// rejected before any job starts. Otherwise every file gets a job and
    /// `on_complete` fires once per stored file, in completion order.
    pub async fn upload_batch<F>(
        &self,
        files: Vec<UploadFile>,
        context: &UploadContext,
        already_uploaded: usize,
        mut on_complete: F,
    ) -> Result<BatchReport, ValidationError>
    where
        F: FnMut(&CompletedUpload),
    {
        if let Err(err) = self.policy.validate_count(already_uploaded, files.len()) {
            tracing::warn!("batch rejected: {err}");
            return Err(err);
        }

        let batch_id = Uuid::new_v4().to_string();
        tracing::info!(batch_id = %batch_id, files = files.len(), "upload batch started");

        let mut jobs: Vec<UploadJob> = files
            .iter()
            .enumerate()
            .map(|(index, file)| UploadJob::new(index, file.name.clone()))
            .collect();
        for job in &jobs {
            self.emit_job(&batch_id, job);
        }

        let mut ready = VecDeque::new();
        for (job, file) in jobs.iter_mut().zip(files) {
            self.transition(&batch_id, job, JobStatus::Validating);
            match self.policy.validate_file(&file) {
                Ok(()) => {
                    job.generated_key = Some(generate_object_key(
                        &context.context_id,
                        &context.category,
                        &file.name,
                        now_ms(),
                    ));
                    ready.push_back((job.index, file));
                }
                Err(err) => {
                    tracing::warn!(batch_id = %batch_id, file = %file.name, "file rejected: {err}");
                    job.error = Some(err.into());
                    self.transition(&batch_id, job, JobStatus::Failed);
                }
            }
        }

        let start = |index: usize, key: String, file: UploadFile| {
            let storage = Arc::clone(&self.storage);
            async move {
                let result = storage.upload(&key, &file).await;
                (index, key, result)
            }
        };
        let cap = self.policy.max_in_flight.unwrap_or(usize::MAX).max(1);
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < cap {
                let Some((index, file)) = ready.pop_front() else {
                    break;
                };
                let job = &mut jobs[index];
                let Some(key) = job.generated_key.clone() else {
                    tracing::error!(batch_id = %batch_id, index, "validated job without key");
                    continue;
                };
                self.transition(&batch_id, job, JobStatus::Uploading);
                in_flight.push(start(index, key, file));
            }

            let Some((index, key, result)) = in_flight.next().await else {
                break;
            };
            let job = &mut jobs[index];
            match result {
                Ok(receipt) => {
                    job.result_uri = Some(receipt.public_uri.clone());
                    self.transition(&batch_id, job, JobStatus::Done);
                    on_complete(&CompletedUpload {
                        index,
                        key,
                        uri: receipt.public_uri,
                    });
                }
                Err(err) => {
                    tracing::warn!(batch_id = %batch_id, key = %key, "upload failed: {err}");
                    job.error = Some(err.into());
                    self.transition(&batch_id, job, JobStatus::Failed);
                }
            }
        }

        let report = BatchReport { batch_id, jobs };
        let summary = report.summary();
        tracing::info!(
            batch_id = %report.batch_id,
            done = summary.done,
            failed = summary.failed,
            "upload batch finished"
        );
        self.record(
            &report.batch_id,
            EventKind::BatchFinished {
                done: summary.done,
                failed: summary.failed,
            },
        );
        Ok(report)
    }

    /// Delete a previously uploaded object.
    ///
    /// Not transactional with the upload: on failure the object stays
    /// stored and nothing is retried.
    pub async fn remove(&self, key: &str) -> Result<(), TransportError> {
        match self.storage.remove(&[key.to_string()]).await {
            Ok(()) => {
                tracing::debug!(key, "object removed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(key, "remove failed; object left in storage: {err}");
                Err(err)
            }
        }
    }

    fn transition(&self, batch_id: &str, job: &mut UploadJob, status: JobStatus) {
        job.status = status;
        self.emit_job(batch_id, job);
    }

    fn emit_job(&self, batch_id: &str, job: &UploadJob) {
        tracing::debug!(batch_id, index = job.index, status = ?job.status, "job status changed");
        self.record(
            batch_id,
            EventKind::JobStatus {
                index: job.index,
                status: job.status,
                error: job.error.as_ref().map(ToString::to_string),
            },
        );
    }

    fn record(&self, batch_id: &str, kind: EventKind) {
        if let Some(sink) = &self.events {
            sink.lock().record(build_event(batch_id, kind));
        }
    }
}

/// A stored object the caller keeps on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedResource {
    /// Storage key.
    pub key: String,
    /// Public uri.
    pub uri: String,
}

/// The caller's list of already uploaded objects.
///
/// Grows from completion callbacks and shrinks only after storage confirms a
/// removal, so a failed remove keeps the entry that still exists remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedUploads {
    items: Vec<UploadedResource>,
}

impl TrackedUploads {
    /// Empty list.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of tracked objects; pass as `already_uploaded`.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Tracked objects in completion order.
    pub fn items(&self) -> &[UploadedResource] {
        &self.items
    }

    /// Whether `key` is tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|item| item.key == key)
    }

    /// Append a completed upload.
    pub fn record(&mut self, completed: &CompletedUpload) {
        self.items.push(UploadedResource {
            key: completed.key.clone(),
            uri: completed.uri.clone(),
        });
    }

    /// Remove `key` from storage, then from the list if storage agreed.
    pub async fn remove_via(
        &mut self,
        uploader: &BatchUploader,
        key: &str,
    ) -> Result<(), TransportError> {
        uploader.remove(key).await?;
        self.items.retain(|item| item.key != key);
        Ok(())
    }
}
