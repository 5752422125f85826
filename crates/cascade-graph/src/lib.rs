//! Cascade Graph (cascade-graph)
//!
//! Construction phase of a deployment:
//! 1. [`GraphBuilder`] builds one [`DependencyGraph`] per environment and
//!    reports structural errors ([`GraphError`])
//! 2. [`decompose`] splits a graph into independent [`Component`]s, each in
//!    deterministic topological order
//! 3. [`plan`] runs both steps for a list of projects
//!
//! # Quick Start
//!
//! ```
//! use cascade_core::prelude::*;
//! use cascade_graph::{plan, GraphBuilder};
//!
//! let kind = ConfigKind::ClassicApi { api: "auto-tag".into() };
//! let project = Project::new("p")
//!     .with_config(ConfigObject::new(Coordinate::new("p", "auto-tag", "a"), kind.clone(), "dev"))
//!     .with_config(
//!         ConfigObject::new(Coordinate::new("p", "auto-tag", "b"), kind, "dev").with_parameter(
//!             "a",
//!             Parameter::reference(Coordinate::new("", "auto-tag", "a"), "id"),
//!         ),
//!     );
//!
//! let plans = plan(&[project], &GraphBuilder::new());
//! let order: Vec<String> = plans["dev"].components()[0]
//!     .order()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(order, vec!["p:auto-tag:a", "p:auto-tag:b"]);
//! ```

pub mod builder;
mod dot;
pub mod error;
pub mod graph;
pub mod order;
pub mod plan;

pub use builder::{BuiltGraph, GraphBuilder};
pub use error::{CycleError, GraphError};
pub use graph::{DependencyGraph, ProjectDependencyMode};
pub use order::{decompose, Component};
pub use plan::{plan, EnvironmentPlan};
