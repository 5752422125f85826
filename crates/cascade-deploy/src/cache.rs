//! Run-scoped cache of listing results using moka
//!
//! One [`ListingCache`] is created per environment and deployment run, so
//! no listing outlives the run that fetched it.

use crate::client::{ApiClient, Endpoint, RemoteObject};
use crate::error::ClientError;
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_CAPACITY: u64 = 1024;

/// Cache of `list` results keyed by endpoint
#[derive(Debug, Clone)]
pub struct ListingCache {
    inner: Cache<Endpoint, Arc<Vec<RemoteObject>>>,
}

impl ListingCache {
    /// Create cache holding at most `max_capacity` listings
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Listing of `endpoint`, fetched through `client` on a miss
    ///
    /// # Errors
    /// Propagates the client's error; failures are not cached.
    pub async fn list(
        &self,
        client: &dyn ApiClient,
        endpoint: &Endpoint,
    ) -> Result<Arc<Vec<RemoteObject>>, ClientError> {
        if let Some(hit) = self.inner.get(endpoint).await {
            return Ok(hit);
        }

        debug!(%endpoint, "listing cache miss");
        let listing = Arc::new(client.list(endpoint).await?);
        self.inner
            .insert(endpoint.clone(), Arc::clone(&listing))
            .await;
        Ok(listing)
    }

    /// Drop the listing of `endpoint`, after a write to it
    pub async fn invalidate(&self, endpoint: &Endpoint) {
        self.inner.invalidate(endpoint).await;
    }

    /// Check if a listing is cached
    #[must_use]
    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.inner.contains_key(endpoint)
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
