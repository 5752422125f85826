use super::{display_name, payload, required_str, ConfigDeployer, DeployContext};
use crate::client::Endpoint;
use crate::entity::{Properties, ResolvedEntity};
use crate::error::DeployError;
use async_trait::async_trait;
use cascade_core::{ConfigKind, ConfigObject, Coordinate, KindTag};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

const EXTERNAL_ID_PREFIX: &str = "cascade:";
const EXTERNAL_ID_HASH_LEN: usize = 40;

/// Deterministic external id of a settings object
///
/// # Example
/// ```
/// use cascade_core::Coordinate;
/// use cascade_deploy::deployers::external_id;
///
/// let id = external_id(&Coordinate::new("p", "builtin:alerting.profile", "a1"));
/// assert!(id.starts_with("cascade:"));
/// assert_eq!(id, external_id(&Coordinate::new("p", "builtin:alerting.profile", "a1")));
/// ```
#[must_use]
pub fn external_id(coordinate: &Coordinate) -> String {
    let digest = Sha256::digest(coordinate.to_string().as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(EXTERNAL_ID_HASH_LEN);
    format!("{EXTERNAL_ID_PREFIX}{hash}")
}

/// Settings 2.0 objects, identified by external id
///
/// The `scope` parameter is required.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettingsDeployer;

impl SettingsDeployer {
    /// Endpoint of one schema
    #[must_use]
    pub fn endpoint(schema_id: &str) -> Endpoint {
        Endpoint::new(KindTag::Settings, format!("/api/v2/settings/{schema_id}"))
    }
}

#[async_trait]
impl ConfigDeployer for SettingsDeployer {
    fn kind(&self) -> KindTag {
        KindTag::Settings
    }

    async fn deploy(
        &self,
        ctx: &DeployContext<'_>,
        object: &ConfigObject,
        properties: Properties,
    ) -> Result<ResolvedEntity, DeployError> {
        let (schema_id, schema_version) = match object.kind() {
            ConfigKind::Settings {
                schema_id,
                schema_version,
            } => (schema_id.as_str(), schema_version.clone()),
            _ => (object.coordinate().config_type(), None),
        };
        let scope = required_str(&properties, "scope")?;
        let external = external_id(object.coordinate());

        let endpoint = Self::endpoint(schema_id);
        let listing = ctx.cache.list(ctx.client, &endpoint).await?;
        let existing = listing
            .iter()
            .find(|remote| {
                remote.payload.get("externalId").and_then(Value::as_str) == Some(external.as_str())
            })
            .map(|remote| remote.id.clone());

        let mut body = json!({
            "schemaId": schema_id,
            "scope": scope,
            "externalId": external,
            "value": Value::Object(payload(object, &properties)?),
        });
        if let Some(version) = schema_version {
            body["schemaVersion"] = Value::String(version);
        }

        let remote = ctx
            .client
            .upsert(&endpoint, existing.as_deref(), body)
            .await?;
        ctx.cache.invalidate(&endpoint).await;

        Ok(ResolvedEntity::new(
            object.coordinate().clone(),
            remote.id,
            display_name(object, &properties),
            properties,
        ))
    }
}
