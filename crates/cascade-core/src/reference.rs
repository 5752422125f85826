//! Reference extraction and the can-reference policy
//!
//! [`ReferenceExtractor`] turns the parameters of a [`ConfigObject`] into
//! the set of coordinates it depends on:
//!
//! 1. empty target projects are resolved to the referencing project
//! 2. references to the object's own coordinate are local and dropped
//! 3. references the [`ReferencePolicy`] rejects are dropped
//!
//! The result is deduplicated and sorted.

use crate::config::ConfigObject;
use crate::coordinate::Coordinate;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Decides whether a reference from `source` to `target` creates a dependency
pub trait ReferencePolicy: Send + Sync {
    /// True if `source` may depend on `target`
    fn can_reference(&self, source: &Coordinate, target: &Coordinate) -> bool;
}

impl<F> ReferencePolicy for F
where
    F: Fn(&Coordinate, &Coordinate) -> bool + Send + Sync,
{
    fn can_reference(&self, source: &Coordinate, target: &Coordinate) -> bool {
        self(source, target)
    }
}

/// Types whose objects never depend on other objects of the same type
///
/// Dashboards link to each other freely; such links must not order the
/// deployment or form cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonReferenceableTypes {
    types: BTreeSet<String>,
}

impl NonReferenceableTypes {
    /// Policy over the given type ids
    #[must_use]
    pub fn new<S: Into<String>>(types: impl IntoIterator<Item = S>) -> Self {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Policy that accepts every reference
    #[must_use]
    pub fn none() -> Self {
        Self {
            types: BTreeSet::new(),
        }
    }

    /// Check if a type id is listed
    #[inline]
    #[must_use]
    pub fn contains(&self, config_type: &str) -> bool {
        self.types.contains(config_type)
    }
}

impl Default for NonReferenceableTypes {
    fn default() -> Self {
        Self::new(["dashboard", "dashboard-v2"])
    }
}

impl ReferencePolicy for NonReferenceableTypes {
    fn can_reference(&self, source: &Coordinate, target: &Coordinate) -> bool {
        !(source.config_type() == target.config_type() && self.contains(source.config_type()))
    }
}

/// Extracts dependency coordinates from configuration objects
#[derive(Clone)]
pub struct ReferenceExtractor {
    policy: Arc<dyn ReferencePolicy>,
}

impl ReferenceExtractor {
    /// Extractor with the given policy
    #[must_use]
    pub fn new(policy: impl ReferencePolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// The policy in use
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &dyn ReferencePolicy {
        self.policy.as_ref()
    }

    /// Coordinates `object` depends on
    #[must_use]
    pub fn extract(&self, object: &ConfigObject) -> BTreeSet<Coordinate> {
        let own = object.coordinate();

        object
            .raw_references()
            .map(|reference| reference.target.resolve_project(own.project()))
            .filter(|target| target != own)
            .filter(|target| self.policy.can_reference(own, target))
            .collect()
    }
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new(NonReferenceableTypes::default())
    }
}

impl fmt::Debug for ReferenceExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceExtractor").finish_non_exhaustive()
    }
}
