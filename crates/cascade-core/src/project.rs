//! Projects - the grouping unit of configuration objects
//!
//! A project holds its objects per environment and per type, plus the
//! projects it depends on per environment. The flattening helpers turn a
//! project list into the per-environment inputs of graph construction.

use crate::config::ConfigObject;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Objects of one project: environment -> type -> objects
pub type ConfigsByEnvironment = BTreeMap<String, BTreeMap<String, Vec<ConfigObject>>>;

/// Declared project dependencies of one environment: project -> projects it depends on
pub type ProjectDependencies = BTreeMap<String, BTreeSet<String>>;

/// One project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    id: String,
    #[serde(default)]
    configs: ConfigsByEnvironment,
    #[serde(default)]
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl Project {
    /// Create empty project
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            configs: BTreeMap::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Add an object under its environment and coordinate type
    #[must_use]
    pub fn with_config(mut self, object: ConfigObject) -> Self {
        self.add_config(object);
        self
    }

    /// Declare that this project depends on `project` in `environment`
    #[must_use]
    pub fn with_dependency(
        mut self,
        environment: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        self.add_dependency(environment, project);
        self
    }

    /// Add an object under its environment and coordinate type
    pub fn add_config(&mut self, object: ConfigObject) {
        self.configs
            .entry(object.environment().to_string())
            .or_default()
            .entry(object.coordinate().config_type().to_string())
            .or_default()
            .push(object);
    }

    /// Declare that this project depends on `project` in `environment`
    pub fn add_dependency(&mut self, environment: impl Into<String>, project: impl Into<String>) {
        self.dependencies
            .entry(environment.into())
            .or_default()
            .insert(project.into());
    }

    /// Project id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Objects by environment and type
    #[inline]
    #[must_use]
    pub fn configs(&self) -> &ConfigsByEnvironment {
        &self.configs
    }

    /// Projects this project depends on in `environment`
    #[must_use]
    pub fn dependencies_in(&self, environment: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(environment)
    }

    /// Environments this project has objects or dependencies in
    #[must_use]
    pub fn environments(&self) -> BTreeSet<&str> {
        self.configs
            .keys()
            .chain(self.dependencies.keys())
            .map(String::as_str)
            .collect()
    }

    /// Number of objects across all environments
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.configs
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

/// Flatten projects into the objects of each environment
///
/// Objects keep project order, then type order, then insertion order.
#[must_use]
pub fn objects_by_environment(projects: &[Project]) -> BTreeMap<String, Vec<ConfigObject>> {
    let mut out: BTreeMap<String, Vec<ConfigObject>> = BTreeMap::new();

    for project in projects {
        for (environment, by_type) in &project.configs {
            let objects = out.entry(environment.clone()).or_default();
            for typed in by_type.values() {
                objects.extend(typed.iter().cloned());
            }
        }
    }

    out
}

/// Flatten declared project dependencies per environment
///
/// Self-dependencies are dropped.
#[must_use]
pub fn dependencies_by_environment(projects: &[Project]) -> BTreeMap<String, ProjectDependencies> {
    let mut out: BTreeMap<String, ProjectDependencies> = BTreeMap::new();

    for project in projects {
        for (environment, targets) in &project.dependencies {
            let targets: BTreeSet<String> = targets
                .iter()
                .filter(|target| target.as_str() != project.id)
                .cloned()
                .collect();
            if targets.is_empty() {
                continue;
            }
            out.entry(environment.clone())
                .or_default()
                .entry(project.id.clone())
                .or_default()
                .extend(targets);
        }
    }

    out
}
