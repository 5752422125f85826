//! Parameter resolution
//!
//! Turns an object's parameters into JSON values. References are looked up
//! in the [`EntityMap`] of the run; references to the object's own
//! coordinate name another parameter of the same object.

use crate::entity::{EntityMap, Properties};
use crate::error::ResolveError;
use cascade_core::{ConfigObject, Parameter};
use serde_json::Value;
use std::collections::BTreeSet;

/// Resolve every parameter of `object`
///
/// # Errors
/// See [`ResolveError`].
pub fn resolve_parameters(
    object: &ConfigObject,
    entities: &EntityMap,
) -> Result<Properties, ResolveError> {
    let mut resolver = Resolver {
        object,
        entities,
        resolved: Properties::new(),
        visiting: BTreeSet::new(),
    };

    for name in object.parameters().keys() {
        resolver.resolve_named(name)?;
    }

    Ok(resolver.resolved)
}

struct Resolver<'a> {
    object: &'a ConfigObject,
    entities: &'a EntityMap,
    resolved: Properties,
    visiting: BTreeSet<&'a str>,
}

impl<'a> Resolver<'a> {
    fn resolve_named(&mut self, name: &'a str) -> Result<Value, ResolveError> {
        if let Some(value) = self.resolved.get(name) {
            return Ok(value.clone());
        }
        if !self.visiting.insert(name) {
            return Err(ResolveError::LocalCycle {
                name: name.to_string(),
            });
        }

        let parameter =
            self.object
                .parameters()
                .get(name)
                .ok_or_else(|| ResolveError::MissingLocal {
                    name: name.to_string(),
                })?;
        let value = self.resolve(parameter)?;

        self.visiting.remove(name);
        self.resolved.insert(name.to_string(), value.clone());
        Ok(value)
    }

    fn resolve(&mut self, parameter: &'a Parameter) -> Result<Value, ResolveError> {
        match parameter {
            Parameter::Value { value } => Ok(value.clone()),
            Parameter::Reference(reference) => {
                let own = self.object.coordinate();
                let target = reference.target.resolve_project(own.project());

                if &target == own {
                    return self.resolve_named(&reference.property);
                }

                let entity = self
                    .entities
                    .get(&target)
                    .ok_or_else(|| ResolveError::MissingEntity {
                        target: target.clone(),
                    })?;
                entity
                    .property(&reference.property)
                    .cloned()
                    .ok_or(ResolveError::MissingProperty {
                        target,
                        property: reference.property.clone(),
                    })
            }
            Parameter::Compound { parameters } => {
                let mut map = serde_json::Map::new();
                for (name, nested) in parameters {
                    map.insert(name.clone(), self.resolve(nested)?);
                }
                Ok(Value::Object(map))
            }
            Parameter::List { values } => values
                .iter()
                .map(|nested| self.resolve(nested))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }
}
