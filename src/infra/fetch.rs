//! In-memory resource fetcher.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::capability::ResourceFetcher;
use crate::core::TransportError;

/// Fetcher that succeeds for every uri except those marked as failing.
#[derive(Default)]
pub struct InMemoryFetcher {
    failing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
}

impl InMemoryFetcher {
    /// Fetcher where everything succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make fetches of `uri` fail.
    pub fn fail(&self, uri: impl Into<String>) {
        self.failing.lock().insert(uri.into());
    }

    /// Uris fetched so far, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }
}

#[async_trait]
impl ResourceFetcher for InMemoryFetcher {
    async fn fetch(&self, uri: &str) -> Result<(), TransportError> {
        self.fetched.lock().push(uri.to_string());
        if self.failing.lock().contains(uri) {
            return Err(TransportError::Fetch(format!("404 for {uri}")));
        }
        Ok(())
    }
}
