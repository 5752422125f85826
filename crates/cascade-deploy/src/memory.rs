//! In-memory API client
//!
//! Backs dry runs and tests. Objects live in one map per endpoint; ids the
//! caller does not supply are random UUIDs.

use crate::client::{ApiClient, Endpoint, RemoteObject};
use crate::error::ClientError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// [`ApiClient`] storing objects in memory
#[derive(Debug, Default)]
pub struct InMemoryClient {
    store: RwLock<HashMap<Endpoint, BTreeMap<String, RemoteObject>>>,
    list_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl InMemoryClient {
    /// Empty client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, as if it already existed remotely
    pub fn seed(&self, endpoint: &Endpoint, object: RemoteObject) {
        self.store
            .write()
            .entry(endpoint.clone())
            .or_default()
            .insert(object.id.clone(), object);
    }

    /// Objects stored at `endpoint`, ordered by id
    #[must_use]
    pub fn objects(&self, endpoint: &Endpoint) -> Vec<RemoteObject> {
        self.store
            .read()
            .get(endpoint)
            .map(|objects| objects.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of stored objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read().values().map(BTreeMap::len).sum()
    }

    /// True if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `list` calls served
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    /// Number of `upsert` calls served
    #[must_use]
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ApiClient for InMemoryClient {
    async fn list(&self, endpoint: &Endpoint) -> Result<Vec<RemoteObject>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.objects(endpoint))
    }

    async fn get(&self, endpoint: &Endpoint, id: &str) -> Result<Option<RemoteObject>, ClientError> {
        Ok(self
            .store
            .read()
            .get(endpoint)
            .and_then(|objects| objects.get(id))
            .cloned())
    }

    async fn upsert(
        &self,
        endpoint: &Endpoint,
        id: Option<&str>,
        payload: Value,
    ) -> Result<RemoteObject, ClientError> {
        self.upsert_calls.fetch_add(1, Ordering::Relaxed);

        let id = id.map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);
        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let object = RemoteObject { id, name, payload };

        self.seed(endpoint, object.clone());
        Ok(object)
    }

    async fn delete(&self, endpoint: &Endpoint, id: &str) -> Result<(), ClientError> {
        self.store
            .write()
            .get_mut(endpoint)
            .and_then(|objects| objects.remove(id))
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound {
                endpoint: endpoint.clone(),
                id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::KindTag;
    use serde_json::json;

    fn endpoint() -> Endpoint {
        Endpoint::new(KindTag::Segment, "/segments")
    }

    #[tokio::test]
    async fn upsert_assigns_id_and_name() {
        let client = InMemoryClient::new();
        let created = client
            .upsert(&endpoint(), None, json!({ "name": "S" }))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(created.name.as_deref(), Some("S"));
        assert_eq!(
            client.get(&endpoint(), &created.id).await.unwrap(),
            Some(created)
        );
        assert_eq!(client.upsert_calls(), 1);
    }

    #[tokio::test]
    async fn upsert_with_id_overwrites() {
        let client = InMemoryClient::new();
        client
            .upsert(&endpoint(), Some("x"), json!({ "v": 1 }))
            .await
            .unwrap();
        client
            .upsert(&endpoint(), Some("x"), json!({ "v": 2 }))
            .await
            .unwrap();

        let objects = client.list(&endpoint()).await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].payload, json!({ "v": 2 }));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let client = InMemoryClient::new();
        let err = client.delete(&endpoint(), "nope").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));

        client.seed(
            &endpoint(),
            RemoteObject {
                id: "a".into(),
                name: None,
                payload: json!({}),
            },
        );
        client.delete(&endpoint(), "a").await.unwrap();
        assert!(client.is_empty());
    }
}
