//! Testing utilities for the Cascade workspace
//!
//! Object builders, a deployer that records calls and injects failures,
//! and in-memory client sets.

#![allow(missing_docs)]

use async_trait::async_trait;
use cascade_core::{ConfigKind, ConfigObject, Coordinate, KindTag, Parameter, Project};
use cascade_deploy::{
    ClientError, ClientSet, ConfigDeployer, DeployContext, DeployError, DeployerRegistry, Endpoint,
    InMemoryClient, Properties, ResolvedEntity,
};
use cascade_graph::{plan, EnvironmentPlan, GraphBuilder};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub const ENV: &str = "dev";

pub fn coord(project: &str, config_type: &str, id: &str) -> Coordinate {
    Coordinate::new(project, config_type, id)
}

/// Classic API object in [`ENV`] whose template carries its `name`
pub fn object(project: &str, config_type: &str, id: &str) -> ConfigObject {
    ConfigObject::new(
        coord(project, config_type, id),
        ConfigKind::ClassicApi {
            api: config_type.to_string(),
        },
        ENV,
    )
    .with_template(r#"{"name": "{{ .name }}"}"#)
    .with_parameter("name", Parameter::value(id))
}

/// Add a reference from `object` to the `id` of `target`
pub fn depends_on(object: ConfigObject, target: &Coordinate) -> ConfigObject {
    let name = format!("{}-{}", target.config_type(), target.config_id());
    object.with_parameter(name, Parameter::reference(target.clone(), "id"))
}

/// Chain where each object depends on the previous one
pub fn chain(project: &str, config_type: &str, ids: &[&str]) -> Vec<ConfigObject> {
    let mut objects: Vec<ConfigObject> = Vec::with_capacity(ids.len());
    for id in ids {
        let mut next = object(project, config_type, id);
        if let Some(previous) = objects.last() {
            next = depends_on(next, previous.coordinate());
        }
        objects.push(next);
    }
    objects
}

pub fn project_with(id: &str, objects: impl IntoIterator<Item = ConfigObject>) -> Project {
    objects
        .into_iter()
        .fold(Project::new(id), Project::with_config)
}

pub fn plan_projects(projects: &[Project]) -> BTreeMap<String, EnvironmentPlan> {
    plan(projects, &GraphBuilder::new())
}

/// One uniform in-memory client set per environment
pub fn memory_clients(environments: &[&str]) -> BTreeMap<String, ClientSet> {
    environments
        .iter()
        .map(|env| {
            (
                (*env).to_string(),
                ClientSet::uniform(Arc::new(InMemoryClient::new())),
            )
        })
        .collect()
}

/// Calls seen by [`RecordingDeployer`]s, plus objects that must fail
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<Coordinate>>,
    failing: Mutex<HashSet<Coordinate>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, coordinate: &Coordinate) {
        self.failing.lock().insert(coordinate.clone());
    }

    pub fn calls(&self) -> Vec<Coordinate> {
        self.calls.lock().clone()
    }

    pub fn was_called(&self, coordinate: &Coordinate) -> bool {
        self.calls.lock().contains(coordinate)
    }

    fn record(&self, coordinate: &Coordinate) -> bool {
        self.calls.lock().push(coordinate.clone());
        !self.failing.lock().contains(coordinate)
    }
}

/// Deployer that records every call and fails on request
#[derive(Debug, Clone)]
pub struct RecordingDeployer {
    kind: KindTag,
    recorder: Arc<Recorder>,
}

impl RecordingDeployer {
    pub fn new(kind: KindTag, recorder: Arc<Recorder>) -> Self {
        Self { kind, recorder }
    }
}

#[async_trait]
impl ConfigDeployer for RecordingDeployer {
    fn kind(&self) -> KindTag {
        self.kind
    }

    async fn deploy(
        &self,
        _ctx: &DeployContext<'_>,
        object: &ConfigObject,
        properties: Properties,
    ) -> Result<ResolvedEntity, DeployError> {
        let coordinate = object.coordinate();
        if !self.recorder.record(coordinate) {
            return Err(DeployError::Client(ClientError::Request {
                endpoint: Endpoint::new(self.kind, "/recording"),
                message: "injected failure".to_string(),
            }));
        }
        Ok(ResolvedEntity::new(
            coordinate.clone(),
            format!("id-{}", coordinate.config_id()),
            coordinate.config_id(),
            properties,
        ))
    }
}

/// Registry with a [`RecordingDeployer`] for every kind
pub fn registry_with(recorder: &Arc<Recorder>) -> DeployerRegistry {
    let mut registry = DeployerRegistry::new();
    for kind in KindTag::ALL {
        registry.register(Arc::new(RecordingDeployer::new(kind, Arc::clone(recorder))));
    }
    registry
}
