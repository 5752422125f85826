//! Cascade Deploy (cascade-deploy)
//!
//! Execution phase of a deployment. Takes the plans produced by
//! `cascade-graph` and deploys every component through per-kind
//! [`ConfigDeployer`]s, resolving references against the entities
//! deployed earlier in the same run.
//!
//! # Quick Start
//!
//! ```
//! use cascade_core::prelude::*;
//! use cascade_deploy::prelude::*;
//! use cascade_graph::{plan, GraphBuilder};
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! # futures::executor::block_on(async {
//! let object = ConfigObject::new(
//!     Coordinate::new("p", "auto-tag", "t1"),
//!     ConfigKind::ClassicApi { api: "auto-tag".into() },
//!     "dev",
//! )
//! .with_template(r#"{"name": "{{ .name }}"}"#)
//! .with_parameter("name", Parameter::value("team-a"));
//!
//! let plans = plan(&[Project::new("p").with_config(object)], &GraphBuilder::new());
//! let clients = BTreeMap::from([(
//!     "dev".to_string(),
//!     ClientSet::uniform(Arc::new(InMemoryClient::new())),
//! )]);
//!
//! let report = Orchestrator::new(DeployerRegistry::with_defaults())
//!     .deploy(&plans, &clients)
//!     .await;
//! assert!(!report.has_errors());
//! # });
//! ```

pub mod cache;
pub mod client;
pub mod deployers;
pub mod entity;
pub mod error;
pub mod memory;
pub mod options;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod state;
pub mod template;
pub mod tracker;

pub use cache::ListingCache;
pub use client::{ApiClient, ClientSet, Endpoint, RemoteObject};
pub use deployers::{ConfigDeployer, DeployContext};
pub use entity::{EntityMap, Properties, ResolvedEntity};
pub use error::{ClientError, DeployError, DeploymentError, ResolveError};
pub use memory::InMemoryClient;
pub use options::DeployOptions;
pub use orchestrator::Orchestrator;
pub use registry::DeployerRegistry;
pub use report::{DeploymentReport, EnvironmentReport, NodeResult, Outcome};
pub use resolve::resolve_parameters;
pub use state::{NodeState, StateError};
pub use tracker::StateTracker;

/// Common imports
pub mod prelude {
    pub use crate::client::{ApiClient, ClientSet, Endpoint, RemoteObject};
    pub use crate::deployers::{ConfigDeployer, DeployContext};
    pub use crate::error::{DeployError, DeploymentError};
    pub use crate::memory::InMemoryClient;
    pub use crate::options::DeployOptions;
    pub use crate::orchestrator::Orchestrator;
    pub use crate::registry::DeployerRegistry;
    pub use crate::report::{DeploymentReport, Outcome};
}
