//! Parameters of a configuration object
//!
//! A parameter is either a literal value or a reference to a property of
//! another object's deployed entity. Compound and list parameters nest
//! further parameters, so references can appear at any depth.

use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resolved parameter set keyed by parameter name
pub type Parameters = BTreeMap<String, Parameter>;

/// One parameter of a configuration object
///
/// Serialized internally tagged by `type`:
///
/// ```yaml
/// name: { type: value, value: "My dashboard" }
/// tag:  { type: reference, target: { type: auto-tag, id: t1 }, property: id }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Parameter {
    /// Literal JSON value
    Value {
        /// The value itself
        value: Value,
    },

    /// Reference to a property of another object
    Reference(ParameterReference),

    /// Named nested parameters, resolves to a JSON object
    Compound {
        /// Nested parameters
        parameters: BTreeMap<String, Parameter>,
    },

    /// Ordered nested parameters, resolves to a JSON array
    List {
        /// Nested parameters
        values: Vec<Parameter>,
    },
}

/// Reference to `property` of the entity deployed for `target`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParameterReference {
    /// Referenced object; an empty project means the referencing project
    pub target: Coordinate,

    /// Property of the referenced entity
    pub property: String,
}

impl ParameterReference {
    /// Create new reference
    #[inline]
    #[must_use]
    pub fn new(target: Coordinate, property: impl Into<String>) -> Self {
        Self {
            target,
            property: property.into(),
        }
    }

    /// Same reference with an empty target project replaced by `project`
    #[must_use]
    pub fn resolve_project(&self, project: &str) -> Self {
        Self {
            target: self.target.resolve_project(project),
            property: self.property.clone(),
        }
    }
}

impl Parameter {
    /// Literal value parameter
    #[inline]
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value {
            value: value.into(),
        }
    }

    /// Reference parameter
    #[inline]
    #[must_use]
    pub fn reference(target: Coordinate, property: impl Into<String>) -> Self {
        Self::Reference(ParameterReference::new(target, property))
    }

    /// Compound parameter from name/parameter pairs
    #[must_use]
    pub fn compound<K: Into<String>>(parameters: impl IntoIterator<Item = (K, Parameter)>) -> Self {
        Self::Compound {
            parameters: parameters
                .into_iter()
                .map(|(name, parameter)| (name.into(), parameter))
                .collect(),
        }
    }

    /// List parameter
    #[must_use]
    pub fn list(values: impl IntoIterator<Item = Parameter>) -> Self {
        Self::List {
            values: values.into_iter().collect(),
        }
    }

    /// All references in this parameter, including nested ones
    ///
    /// Order follows the parameter structure; duplicates are kept.
    #[must_use]
    pub fn references(&self) -> Vec<&ParameterReference> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a ParameterReference>) {
        match self {
            Self::Value { .. } => {}
            Self::Reference(reference) => out.push(reference),
            Self::Compound { parameters } => {
                for parameter in parameters.values() {
                    parameter.collect_references(out);
                }
            }
            Self::List { values } => {
                for parameter in values {
                    parameter.collect_references(out);
                }
            }
        }
    }

    /// True if the parameter is a plain literal
    #[inline]
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Value { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coord(id: &str) -> Coordinate {
        Coordinate::new("p", "auto-tag", id)
    }

    #[test]
    fn literal_has_no_references() {
        let p = Parameter::value("hello");
        assert!(p.is_literal());
        assert!(p.references().is_empty());
    }

    #[test]
    fn nested_references_are_found() {
        let p = Parameter::compound([
            ("a", Parameter::reference(coord("t1"), "id")),
            (
                "b",
                Parameter::list([
                    Parameter::value(1),
                    Parameter::reference(coord("t2"), "name"),
                    Parameter::compound([("c", Parameter::reference(coord("t3"), "id"))]),
                ]),
            ),
        ]);

        let targets: Vec<&str> = p
            .references()
            .iter()
            .map(|r| r.target.config_id())
            .collect();
        assert_eq!(targets, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn reference_resolves_empty_project() {
        let r = ParameterReference::new(Coordinate::new("", "auto-tag", "t1"), "id");
        let resolved = r.resolve_project("p");

        assert_eq!(resolved.target, coord("t1"));
        assert_eq!(resolved.property, "id");
    }

    #[test]
    fn parameter_serde_tagged_shape() {
        let p = Parameter::reference(Coordinate::new("", "auto-tag", "t1"), "id");
        let encoded = serde_json::to_value(&p).unwrap();

        assert_eq!(
            encoded,
            json!({
                "type": "reference",
                "target": { "project": "", "type": "auto-tag", "id": "t1" },
                "property": "id"
            })
        );
    }

    #[test]
    fn parameter_deserializes_without_project() {
        let p: Parameter = serde_json::from_value(json!({
            "type": "reference",
            "target": { "type": "auto-tag", "id": "t1" },
            "property": "id"
        }))
        .unwrap();

        let Parameter::Reference(r) = p else {
            panic!("expected reference");
        };
        assert!(r.target.is_project_relative());
    }
}
