//! Coordinate - unique key of one configuration object
//!
//! A [`Coordinate`] is the triple `project:type:id`. Two configuration
//! objects are the same entity iff their coordinates are equal.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Unique identifier of a configuration object
///
/// # Structure
/// - `project`: logical grouping the object belongs to
/// - `config_type`: type identifier (API name, schema id, ...)
/// - `config_id`: object identifier, unique within project and type
///
/// The derived ordering (project, then type, then id) is the stable
/// secondary key used wherever ordering is observable.
///
/// # Example
/// ```
/// use cascade_core::Coordinate;
///
/// let coordinate = Coordinate::new("infra", "dashboard", "overview");
/// assert_eq!(coordinate.to_string(), "infra:dashboard:overview");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Project (grouping) identifier; empty means "the referencing project"
    #[serde(default)]
    project: String,

    /// Type identifier
    #[serde(rename = "type")]
    config_type: String,

    /// Object identifier
    #[serde(rename = "id")]
    config_id: String,
}

impl Coordinate {
    /// Create new coordinate
    #[inline]
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        config_type: impl Into<String>,
        config_id: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            config_type: config_type.into(),
            config_id: config_id.into(),
        }
    }

    /// Project identifier
    #[inline]
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Type identifier
    #[inline]
    #[must_use]
    pub fn config_type(&self) -> &str {
        &self.config_type
    }

    /// Object identifier
    #[inline]
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// True when the project part is empty
    #[inline]
    #[must_use]
    pub fn is_project_relative(&self) -> bool {
        self.project.is_empty()
    }

    /// Fill in an empty project with `project`
    ///
    /// Coordinates that already name a project are returned unchanged.
    #[must_use]
    pub fn resolve_project(&self, project: &str) -> Self {
        if self.is_project_relative() {
            Self {
                project: project.to_string(),
                config_type: self.config_type.clone(),
                config_id: self.config_id.clone(),
            }
        } else {
            self.clone()
        }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.project, self.config_type, self.config_id)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    /// Parse `project:type:id`
    ///
    /// The project part may be empty (`:type:id`); type and id may not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(project), Some(config_type), Some(config_id)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CoordinateError::InvalidFormat(s.to_string()));
        };

        if config_type.is_empty() {
            return Err(CoordinateError::EmptyType(s.to_string()));
        }
        if config_id.is_empty() {
            return Err(CoordinateError::EmptyId(s.to_string()));
        }

        Ok(Self::new(project, config_type, config_id))
    }
}

/// Errors for Coordinate parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// Not of the form `project:type:id`
    #[error("invalid coordinate format, expected project:type:id: {0}")]
    InvalidFormat(String),

    /// Type part is empty
    #[error("coordinate has an empty type: {0}")]
    EmptyType(String),

    /// Id part is empty
    #[error("coordinate has an empty id: {0}")]
    EmptyId(String),
}
