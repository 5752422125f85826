//! Project manifests
//!
//! ```yaml
//! projects:
//!   - id: infra
//!     environments:
//!       dev:
//!         dependencies: [shared]
//!         configs:
//!           - id: t1
//!             kind: { type: classic-api, api: auto-tag }
//!             template: { name: "{{ .name }}" }
//!             parameters:
//!               name: { type: value, value: team-a }
//! ```
//!
//! The coordinate of a config is `<project>:<kind type id>:<id>`. A template
//! may be a JSON string or an inline mapping.

use anyhow::{bail, Context, Result};
use cascade_core::{ConfigKind, ConfigObject, Coordinate, Parameters, Project};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Parsed manifest file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Projects
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

/// One project of a manifest
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectEntry {
    /// Project id
    pub id: String,

    /// Environment name -> configs and dependencies
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentEntry>,
}

/// Configs and dependencies of a project in one environment
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentEntry {
    /// Configuration objects
    #[serde(default)]
    pub configs: Vec<ConfigEntry>,

    /// Projects this project depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// One configuration object
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigEntry {
    /// Config id, unique per project and type
    pub id: String,

    /// Configuration kind
    pub kind: ConfigKind,

    /// JSON template, as a string or inline
    #[serde(default)]
    pub template: Option<Value>,

    /// Named parameters
    #[serde(default)]
    pub parameters: Parameters,

    /// Never deploy
    #[serde(default)]
    pub skip: bool,
}

impl ConfigEntry {
    fn into_object(self, project: &str, environment: &str) -> Result<ConfigObject> {
        if self.id.is_empty() {
            bail!("config without id in project {project}, environment {environment}");
        }
        let coordinate = Coordinate::new(project, self.kind.type_id(), &self.id);
        let template = match self.template {
            None => String::new(),
            Some(Value::String(text)) => text,
            Some(inline) => serde_json::to_string(&inline)
                .with_context(|| format!("template of {coordinate} is not representable"))?,
        };

        Ok(ConfigObject::new(coordinate, self.kind, environment)
            .with_template(template)
            .with_parameters(self.parameters)
            .with_skip(self.skip))
    }
}

impl Manifest {
    /// Convert into projects
    ///
    /// # Errors
    /// Fails on duplicate project ids and configs without an id.
    pub fn into_projects(self) -> Result<Vec<Project>> {
        let mut seen = BTreeSet::new();
        let mut projects = Vec::with_capacity(self.projects.len());

        for entry in self.projects {
            if entry.id.is_empty() {
                bail!("project without id");
            }
            if !seen.insert(entry.id.clone()) {
                bail!("project {} is declared more than once", entry.id);
            }

            let mut project = Project::new(entry.id.clone());
            for (environment, env_entry) in entry.environments {
                for dependency in env_entry.dependencies {
                    project.add_dependency(environment.clone(), dependency);
                }
                for config in env_entry.configs {
                    project.add_config(config.into_object(&entry.id, &environment)?);
                }
            }
            projects.push(project);
        }

        Ok(projects)
    }
}

/// Parse manifest text into projects
///
/// # Errors
/// Invalid YAML or an invalid manifest.
pub fn parse(text: &str) -> Result<Vec<Project>> {
    let manifest: Manifest = serde_yaml::from_str(text).context("invalid manifest")?;
    manifest.into_projects()
}

/// Load a manifest file
///
/// # Errors
/// Unreadable file or invalid manifest.
pub fn load(path: &Path) -> Result<Vec<Project>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to load manifest {}", path.display()))
}
