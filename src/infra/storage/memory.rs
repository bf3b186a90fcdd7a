//! In-memory object storage backend.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::batch_uploader::UploadFile;
use crate::core::capability::{ObjectStorage, UploadReceipt};
use crate::core::TransportError;

/// Metadata kept for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// MIME type at upload time.
    pub mime_type: String,
    /// Payload size.
    pub size: u64,
}

#[derive(Default)]
struct StorageState {
    objects: HashMap<String, StoredObject>,
    upload_calls: Vec<String>,
    remove_calls: Vec<Vec<String>>,
    failing_files: HashSet<String>,
    fail_removes: bool,
}

/// Simple in-memory storage for development/testing.
///
/// Uploads of files whose name was passed to
/// [`fail_uploads_for`](Self::fail_uploads_for) are rejected, and removes can
/// be made to fail wholesale.
pub struct InMemoryStorage {
    base_url: String,
    state: Mutex<StorageState>,
}

impl InMemoryStorage {
    /// Create storage serving public uris under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            state: Mutex::new(StorageState::default()),
        }
    }

    /// Reject every upload of a file called `file_name`.
    pub fn fail_uploads_for(&self, file_name: impl Into<String>) {
        self.state.lock().failing_files.insert(file_name.into());
    }

    /// Make every remove fail (or succeed again).
    pub fn set_fail_removes(&self, fail: bool) {
        self.state.lock().fail_removes = fail;
    }

    /// Keys submitted to `upload`, in call order.
    pub fn upload_calls(&self) -> Vec<String> {
        self.state.lock().upload_calls.clone()
    }

    /// Key lists submitted to `remove`, in call order.
    pub fn remove_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().remove_calls.clone()
    }

    /// Stored object under `key`, if any.
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.state.lock().objects.get(key).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.state.lock().objects.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.state.lock().objects.is_empty()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn upload(&self, key: &str, file: &UploadFile) -> Result<UploadReceipt, TransportError> {
        let mut state = self.state.lock();
        state.upload_calls.push(key.to_string());
        if state.failing_files.contains(&file.name) {
            return Err(TransportError::Upload(format!("storage rejected `{key}`")));
        }
        if state.objects.contains_key(key) {
            return Err(TransportError::Upload(format!("`{key}` already exists")));
        }
        state.objects.insert(
            key.to_string(),
            StoredObject {
                mime_type: file.mime_type.clone(),
                size: file.size(),
            },
        );
        Ok(UploadReceipt {
            public_uri: self.public_url(key),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }

    async fn remove(&self, keys: &[String]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.remove_calls.push(keys.to_vec());
        if state.fail_removes {
            return Err(TransportError::Remove(format!("storage refused {} key(s)", keys.len())));
        }
        for key in keys {
            state.objects.remove(key);
        }
        Ok(())
    }
}
