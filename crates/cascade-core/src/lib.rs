//! Cascade Core (cascade-core)
//!
//! Value types shared by graph construction and deployment:
//! - [`Coordinate`]: unique key of a configuration object
//! - [`ConfigObject`]: the deployable unit and its [`Parameter`]s
//! - [`ConfigKind`] / [`KindTag`]: closed set of configuration families
//! - [`Project`]: grouping of objects with declared project dependencies
//! - [`ReferenceExtractor`] / [`ReferencePolicy`]: dependency discovery
//!
//! # Quick Start
//!
//! ```
//! use cascade_core::prelude::*;
//!
//! let tag = ConfigObject::new(
//!     Coordinate::new("p", "auto-tag", "t1"),
//!     ConfigKind::ClassicApi { api: "auto-tag".into() },
//!     "dev",
//! );
//! let dashboard = ConfigObject::new(
//!     Coordinate::new("p", "dashboard", "d1"),
//!     ConfigKind::ClassicApi { api: "dashboard".into() },
//!     "dev",
//! )
//! .with_parameter(
//!     "tag",
//!     Parameter::reference(Coordinate::new("", "auto-tag", "t1"), "id"),
//! );
//!
//! let deps = ReferenceExtractor::default().extract(&dashboard);
//! assert!(deps.contains(tag.coordinate()));
//! ```

pub mod config;
pub mod coordinate;
pub mod kind;
pub mod parameter;
pub mod project;
pub mod reference;

pub use config::ConfigObject;
pub use coordinate::{Coordinate, CoordinateError};
pub use kind::{AutomationResource, ConfigKind, DocumentKind, KindTag};
pub use parameter::{Parameter, ParameterReference, Parameters};
pub use project::{
    dependencies_by_environment, objects_by_environment, ConfigsByEnvironment, Project,
    ProjectDependencies,
};
pub use reference::{NonReferenceableTypes, ReferenceExtractor, ReferencePolicy};

/// Common imports
pub mod prelude {
    pub use crate::config::ConfigObject;
    pub use crate::coordinate::Coordinate;
    pub use crate::kind::{ConfigKind, KindTag};
    pub use crate::parameter::{Parameter, ParameterReference};
    pub use crate::project::Project;
    pub use crate::reference::{NonReferenceableTypes, ReferenceExtractor, ReferencePolicy};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
