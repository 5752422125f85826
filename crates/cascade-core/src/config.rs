//! Configuration object - the deployable unit

use crate::coordinate::Coordinate;
use crate::kind::ConfigKind;
use crate::parameter::{Parameter, ParameterReference, Parameters};
use serde::{Deserialize, Serialize};

/// One configuration object bound to one environment
///
/// Skipped objects are never deployed but stay in the dependency graph so
/// their dependents can be blocked.
///
/// # Example
/// ```
/// use cascade_core::{ConfigKind, ConfigObject, Coordinate, Parameter};
///
/// let object = ConfigObject::new(
///     Coordinate::new("infra", "dashboard", "overview"),
///     ConfigKind::ClassicApi { api: "dashboard".into() },
///     "prod",
/// )
/// .with_template(r#"{"name": "{{ .name }}"}"#)
/// .with_parameter("name", Parameter::value("Overview"));
///
/// assert!(!object.skip());
/// assert_eq!(object.parameters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigObject {
    coordinate: Coordinate,
    kind: ConfigKind,
    environment: String,
    #[serde(default)]
    template: String,
    #[serde(default)]
    parameters: Parameters,
    #[serde(default)]
    skip: bool,
}

impl ConfigObject {
    /// Create new object with an empty template and no parameters
    #[must_use]
    pub fn new(coordinate: Coordinate, kind: ConfigKind, environment: impl Into<String>) -> Self {
        Self {
            coordinate,
            kind,
            environment: environment.into(),
            template: String::new(),
            parameters: Parameters::new(),
            skip: false,
        }
    }

    /// Set rendered template
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Add one parameter, replacing any parameter of the same name
    #[inline]
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    /// Replace all parameters
    #[inline]
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set skip flag
    #[inline]
    #[must_use]
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Coordinate
    #[inline]
    #[must_use]
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ConfigKind {
        &self.kind
    }

    /// Environment name
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Rendered template
    #[inline]
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameters by name
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Skip flag
    #[inline]
    #[must_use]
    pub fn skip(&self) -> bool {
        self.skip
    }

    /// Project of this object
    #[inline]
    #[must_use]
    pub fn project(&self) -> &str {
        self.coordinate.project()
    }

    /// Every reference in every parameter, unresolved and with duplicates
    pub fn raw_references(&self) -> impl Iterator<Item = &ParameterReference> {
        self.parameters
            .values()
            .flat_map(Parameter::references)
    }
}
