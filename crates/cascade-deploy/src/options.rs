//! Deployment options

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable: keep deploying after a failed node
pub const ENV_CONTINUE_ON_ERROR: &str = "CASCADE_CONTINUE_ON_ERROR";
/// Environment variable: maximum components deployed at once
pub const ENV_CONCURRENT_DEPLOYMENTS: &str = "CASCADE_CONCURRENT_DEPLOYMENTS";
/// Environment variable: deploy components and environments one at a time
pub const ENV_SEQUENTIAL: &str = "CASCADE_SEQUENTIAL";

/// Options of one deployment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployOptions {
    /// Keep deploying an environment after a node failed
    pub continue_on_error: bool,
    /// Deploy independent components concurrently
    pub parallel_components: bool,
    /// Upper bound of concurrently deployed components, at least 1
    pub max_concurrent_components: usize,
    /// Deploy environments concurrently
    pub parallel_environments: bool,
}

impl DeployOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With continue-on-error
    #[inline]
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// With maximum concurrent components (clamped to at least 1)
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_components(mut self, max: usize) -> Self {
        self.max_concurrent_components = max.max(1);
        self
    }

    /// Deploy components and environments one at a time
    #[inline]
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel_components = false;
        self.parallel_environments = false;
        self
    }

    /// Defaults overridden by `CASCADE_*` environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Override fields from variables read through `lookup`
    ///
    /// Unparsable values are ignored with a warning.
    #[must_use]
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(ENV_CONTINUE_ON_ERROR) {
            self.continue_on_error = is_truthy(&value);
        }
        if let Some(value) = lookup(ENV_CONCURRENT_DEPLOYMENTS) {
            match value.trim().parse::<usize>() {
                Ok(max) => self.max_concurrent_components = max.max(1),
                Err(_) => warn!(
                    variable = ENV_CONCURRENT_DEPLOYMENTS,
                    value = %value,
                    "ignoring invalid value"
                ),
            }
        }
        if lookup(ENV_SEQUENTIAL).is_some_and(|value| is_truthy(&value)) {
            self = self.sequential();
        }
        self
    }

    /// Effective concurrency for components
    #[must_use]
    pub fn component_concurrency(&self) -> usize {
        if self.parallel_components {
            self.max_concurrent_components.max(1)
        } else {
            1
        }
    }
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            parallel_components: true,
            max_concurrent_components: 4,
            parallel_environments: true,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
