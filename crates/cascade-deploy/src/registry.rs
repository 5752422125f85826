//! Deployer registry
//!
//! Maps each [`KindTag`] to the [`ConfigDeployer`] handling it. Built once
//! per run and shared read-only by every environment.

use crate::deployers::{
    BucketDeployer, ClassicApiDeployer, ConfigDeployer, OpenPipelineDeployer, SettingsDeployer,
    UuidDeployer,
};
use cascade_core::KindTag;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of deployers keyed by kind
#[derive(Clone, Default)]
pub struct DeployerRegistry {
    deployers: HashMap<KindTag, Arc<dyn ConfigDeployer>>,
}

impl DeployerRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            deployers: HashMap::new(),
        }
    }

    /// Create registry with a deployer for every kind
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ClassicApiDeployer));
        registry.register(Arc::new(SettingsDeployer));
        registry.register(Arc::new(BucketDeployer));
        registry.register(Arc::new(OpenPipelineDeployer));
        for kind in [
            KindTag::Automation,
            KindTag::Document,
            KindTag::Segment,
            KindTag::Slo,
        ] {
            if let Some(deployer) = UuidDeployer::new(kind) {
                registry.register(Arc::new(deployer));
            }
        }
        registry
    }

    /// Register a deployer under its kind, replacing any previous one
    pub fn register(&mut self, deployer: Arc<dyn ConfigDeployer>) {
        self.deployers.insert(deployer.kind(), deployer);
    }

    /// Deployer for a kind
    #[inline]
    #[must_use]
    pub fn get(&self, kind: KindTag) -> Option<&Arc<dyn ConfigDeployer>> {
        self.deployers.get(&kind)
    }

    /// Check if a kind has a deployer
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: KindTag) -> bool {
        self.deployers.contains_key(&kind)
    }

    /// Remove the deployer of a kind
    #[inline]
    pub fn remove(&mut self, kind: KindTag) -> bool {
        self.deployers.remove(&kind).is_some()
    }

    /// Registered kinds, sorted
    #[must_use]
    pub fn kinds(&self) -> Vec<KindTag> {
        let mut kinds: Vec<KindTag> = self.deployers.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    /// Get number of registered deployers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.deployers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deployers.is_empty()
    }
}

impl fmt::Debug for DeployerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
