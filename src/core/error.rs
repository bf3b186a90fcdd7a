//! Error types for loading and upload operations.

use thiserror::Error;

/// A file or batch was rejected before any network call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The file's MIME type does not start with the accepted prefix.
    #[error("unsupported file type `{actual}` (expected {expected_prefix}*)")]
    UnsupportedType {
        /// Accepted MIME prefix, e.g. `image/`.
        expected_prefix: String,
        /// MIME type reported for the file.
        actual: String,
    },
    /// The file exceeds the per-file byte ceiling.
    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Size of the rejected file.
        size: u64,
        /// Configured ceiling.
        limit: u64,
    },
    /// The file carries no bytes.
    #[error("file is empty")]
    EmptyFile,
    /// Already-uploaded plus incoming files would exceed the batch cap.
    #[error("too many files: {existing} uploaded + {incoming} new exceeds limit {limit}")]
    TooManyFiles {
        /// Files already tracked by the caller.
        existing: usize,
        /// Files in the rejected batch.
        incoming: usize,
        /// Configured cap.
        limit: usize,
    },
}

/// A host capability (storage, fetch) rejected an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Storage refused an upload.
    #[error("upload failed: {0}")]
    Upload(String),
    /// Storage refused a removal.
    #[error("remove failed: {0}")]
    Remove(String),
    /// A resource fetch failed.
    #[error("fetch failed: {0}")]
    Fetch(String),
}

/// Failure of a single upload job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Rejected locally; no key was submitted to storage.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Rejected by the storage capability.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl UploadError {
    /// Whether the job failed before reaching storage.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Misuse of a visibility loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// `attach` was called on a loader that already left `Idle`.
    #[error("loader already attached (state: {0})")]
    AlreadyAttached(String),
    /// The loader was detached and cannot be attached again.
    #[error("loader detached")]
    Detached,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
