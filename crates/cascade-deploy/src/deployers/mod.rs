//! Per-kind deployers
//!
//! Each [`ConfigDeployer`] knows how one configuration kind is identified
//! on the platform and written through its [`ApiClient`].
//!
//! | kind | identity |
//! |---|---|
//! | classic API | existing object with the same `name`, else new |
//! | settings | external id derived from the coordinate |
//! | automation, document, segment, SLO | UUIDv5 of the coordinate |
//! | bucket | name derived from project and config id |
//! | OpenPipeline | the pipeline kind |

mod classic;
mod platform;
mod settings;

pub use classic::ClassicApiDeployer;
pub use platform::{BucketDeployer, OpenPipelineDeployer, UuidDeployer};
pub use settings::{external_id, SettingsDeployer};

use crate::cache::ListingCache;
use crate::client::ApiClient;
use crate::entity::{EntityMap, Properties, ResolvedEntity};
use crate::error::DeployError;
use async_trait::async_trait;
use cascade_core::{ConfigObject, KindTag};
use serde_json::Value;

/// Everything a deployer may use besides the object itself
pub struct DeployContext<'a> {
    /// Environment being deployed
    pub environment: &'a str,

    /// Client for the object's kind
    pub client: &'a dyn ApiClient,

    /// Run-scoped listing cache
    pub cache: &'a ListingCache,

    /// Entities deployed so far in this run
    pub entities: &'a EntityMap,
}

/// Deploys objects of one kind
#[async_trait]
pub trait ConfigDeployer: Send + Sync {
    /// Kind handled by this deployer
    fn kind(&self) -> KindTag;

    /// Deploy `object` with its resolved `properties`
    async fn deploy(
        &self,
        ctx: &DeployContext<'_>,
        object: &ConfigObject,
        properties: Properties,
    ) -> Result<ResolvedEntity, DeployError>;
}

/// String parameter `name`, required
pub(crate) fn required_str<'p>(properties: &'p Properties, name: &str) -> Result<&'p str, DeployError> {
    properties
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DeployError::MissingParameter(name.to_string()))
}

/// Display name: the `name` parameter, else the config id
pub(crate) fn display_name(object: &ConfigObject, properties: &Properties) -> String {
    properties
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| object.coordinate().config_id().to_string(), ToString::to_string)
}

/// Rendered template as a JSON object
pub(crate) fn payload(
    object: &ConfigObject,
    properties: &Properties,
) -> Result<serde_json::Map<String, Value>, DeployError> {
    match crate::template::render(object.template(), properties)? {
        Value::Object(map) => Ok(map),
        other => Err(DeployError::InvalidTemplate(format!(
            "expected a JSON object, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
