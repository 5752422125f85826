//! Entities deployed during one run
//!
//! Later objects resolve references against the properties stored here.

use crate::error::DeployError;
use cascade_core::Coordinate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resolved properties of one deployed object
pub type Properties = BTreeMap<String, Value>;

/// Result of deploying one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    /// Display name
    pub name: String,

    /// Deployed object
    pub coordinate: Coordinate,

    /// Resolved parameters plus `id` and `name`
    pub properties: Properties,
}

impl ResolvedEntity {
    /// Create entity; `id` and `name` are added to `properties`
    #[must_use]
    pub fn new(
        coordinate: Coordinate,
        id: impl Into<String>,
        name: impl Into<String>,
        mut properties: Properties,
    ) -> Self {
        let name = name.into();
        properties.insert("id".to_string(), Value::String(id.into()));
        properties.insert("name".to_string(), Value::String(name.clone()));
        Self {
            name,
            coordinate,
            properties,
        }
    }

    /// Platform id
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.properties.get("id").and_then(Value::as_str)
    }

    /// One property
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Concurrency-safe map of deployed entities for one environment
#[derive(Debug, Default)]
pub struct EntityMap {
    entities: DashMap<Coordinate, ResolvedEntity>,
    names: DashMap<(String, String), Coordinate>,
}

impl EntityMap {
    /// Empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a deployed entity
    pub fn insert(&self, entity: ResolvedEntity) {
        self.entities.insert(entity.coordinate.clone(), entity);
    }

    /// Entity deployed for `coordinate`
    #[must_use]
    pub fn get(&self, coordinate: &Coordinate) -> Option<ResolvedEntity> {
        self.entities.get(coordinate).map(|entry| entry.value().clone())
    }

    /// One property of a deployed entity
    #[must_use]
    pub fn property(&self, coordinate: &Coordinate, property: &str) -> Option<Value> {
        self.entities
            .get(coordinate)
            .and_then(|entry| entry.value().property(property).cloned())
    }

    /// Check if `coordinate` has been deployed
    #[inline]
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.entities.contains_key(coordinate)
    }

    /// Number of deployed entities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if nothing has been deployed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Claim `name` within `api` for `owner`
    ///
    /// Claiming again for the same owner succeeds.
    ///
    /// # Errors
    /// [`DeployError::DuplicateName`] if another object holds the name.
    pub fn claim_name(&self, api: &str, name: &str, owner: &Coordinate) -> Result<(), DeployError> {
        match self.names.entry((api.to_string(), name.to_string())) {
            Entry::Occupied(entry) if entry.get() != owner => Err(DeployError::DuplicateName {
                api: api.to_string(),
                name: name.to_string(),
                owner: entry.get().clone(),
            }),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(owner.clone());
                Ok(())
            }
        }
    }

    /// Give up a claim held by `owner`; claims of other objects are kept
    pub fn release_name(&self, api: &str, name: &str, owner: &Coordinate) {
        self.names
            .remove_if(&(api.to_string(), name.to_string()), |_, holder| holder == owner);
    }
}
