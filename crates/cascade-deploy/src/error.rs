//! Error types for deployment
//!
//! - [`ClientError`]: the API client boundary
//! - [`ResolveError`]: parameter resolution
//! - [`DeployError`]: one node's deploy attempt
//! - [`DeploymentError`]: one entry of an environment's error list

use crate::client::Endpoint;
use cascade_core::{Coordinate, KindTag};
use cascade_graph::GraphError;

/// Errors reported by an [`ApiClient`](crate::client::ApiClient)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Object does not exist
    #[error("object {id} not found at {endpoint}")]
    NotFound {
        /// Endpoint queried
        endpoint: Endpoint,
        /// Object id
        id: String,
    },

    /// Request was rejected or failed
    #[error("request to {endpoint} failed: {message}")]
    Request {
        /// Endpoint called
        endpoint: Endpoint,
        /// Failure description
        message: String,
    },
}

/// Errors resolving an object's parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Referenced object has not been deployed in this run
    #[error("referenced configuration {target} has not been deployed")]
    MissingEntity {
        /// Referenced object
        target: Coordinate,
    },

    /// Referenced entity lacks the property
    #[error("configuration {target} has no property {property}")]
    MissingProperty {
        /// Referenced object
        target: Coordinate,
        /// Requested property
        property: String,
    },

    /// Local reference to a parameter that does not exist
    #[error("parameter {name} is not defined")]
    MissingLocal {
        /// Parameter name
        name: String,
    },

    /// Local references form a cycle
    #[error("parameter {name} references itself")]
    LocalCycle {
        /// Parameter at which the cycle was found
        name: String,
    },
}

/// Errors from deploying one node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    /// Parameters could not be resolved
    #[error("parameter resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// API client reported an error
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Rendered template is not valid
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// A parameter the kind requires is absent or not a string
    #[error("required parameter {0} is missing or not a string")]
    MissingParameter(String),

    /// Another object of the same API already uses the name
    #[error("name {name} of {api} is already used by {owner}")]
    DuplicateName {
        /// Classic API
        api: String,
        /// Conflicting name
        name: String,
        /// Object that claimed the name first
        owner: Coordinate,
    },

    /// No deployer registered for the kind
    #[error("no deployer registered for {0}")]
    NoDeployer(KindTag),

    /// No client supplied for the kind
    #[error("no client configured for {0}")]
    NoClient(KindTag),
}

/// One entry of an environment's error list
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeploymentError {
    /// Graph construction found a structural problem
    #[error("structural error: {0}")]
    Structural(#[from] GraphError),

    /// A node failed to deploy
    #[error("failed to deploy {coordinate}: {error}")]
    Deploy {
        /// Failed node
        coordinate: Coordinate,
        /// Cause
        #[source]
        error: DeployError,
    },

    /// The environment could not be deployed at all
    #[error("environment {environment}: {message}")]
    Environment {
        /// Environment name
        environment: String,
        /// Cause
        message: String,
    },
}

impl DeploymentError {
    /// True for errors found during graph construction
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    /// Coordinate of the failed node, for deploy errors
    #[must_use]
    pub fn coordinate(&self) -> Option<&Coordinate> {
        match self {
            Self::Deploy { coordinate, .. } => Some(coordinate),
            Self::Structural(_) | Self::Environment { .. } => None,
        }
    }
}
