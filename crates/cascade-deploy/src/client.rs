//! API client boundary
//!
//! Deployers talk to the platform only through [`ApiClient`]. Retries,
//! rate limiting and authentication belong to implementations.

use crate::error::ClientError;
use async_trait::async_trait;
use cascade_core::KindTag;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Collection of remote objects
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    kind: KindTag,
    path: String,
}

impl Endpoint {
    /// Create new endpoint
    #[inline]
    #[must_use]
    pub fn new(kind: KindTag, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Kind served by this endpoint
    #[inline]
    #[must_use]
    pub fn kind(&self) -> KindTag {
        self.kind
    }

    /// Path of the collection
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Object as stored by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Platform id
    pub id: String,

    /// Display name, if the collection has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Full payload
    pub payload: Value,
}

/// Verb-based access to the platform API
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// List all objects of a collection
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<RemoteObject>, ClientError>;

    /// Fetch one object, `None` if absent
    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<Option<RemoteObject>, ClientError>;

    /// Create or update an object
    ///
    /// With `id` the object is written at that id; without, the platform
    /// assigns one.
    async fn upsert(
        &self,
        endpoint: &Endpoint,
        id: Option<&str>,
        payload: Value,
    ) -> Result<RemoteObject, ClientError>;

    /// Delete an object
    async fn delete(&self, endpoint: &Endpoint, id: &str) -> Result<(), ClientError>;
}

/// Pre-authenticated clients of one environment, one per kind
#[derive(Clone, Default)]
pub struct ClientSet {
    clients: HashMap<KindTag, Arc<dyn ApiClient>>,
}

impl ClientSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set containing `client` for every kind
    #[must_use]
    pub fn uniform(client: Arc<dyn ApiClient>) -> Self {
        KindTag::ALL
            .into_iter()
            .fold(Self::new(), |set, tag| set.with_client(tag, Arc::clone(&client)))
    }

    /// Add or replace the client of one kind
    #[must_use]
    pub fn with_client(mut self, kind: KindTag, client: Arc<dyn ApiClient>) -> Self {
        self.clients.insert(kind, client);
        self
    }

    /// Client for a kind
    #[inline]
    #[must_use]
    pub fn get(&self, kind: KindTag) -> Option<&Arc<dyn ApiClient>> {
        self.clients.get(&kind)
    }

    /// Kinds with a client, sorted
    #[must_use]
    pub fn kinds(&self) -> Vec<KindTag> {
        let mut kinds: Vec<KindTag> = self.clients.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for ClientSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSet")
            .field("kinds", &self.kinds())
            .finish()
    }
}
