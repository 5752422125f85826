use super::{display_name, payload, required_str, ConfigDeployer, DeployContext};
use crate::client::Endpoint;
use crate::entity::{Properties, ResolvedEntity};
use crate::error::DeployError;
use async_trait::async_trait;
use cascade_core::{ConfigKind, ConfigObject, KindTag};
use serde_json::Value;
use tracing::debug;

/// Classic configuration APIs, identified by name
///
/// The object's `name` parameter must be unique per API within one run.
/// An existing remote object with that name is updated in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicApiDeployer;

impl ClassicApiDeployer {
    /// Endpoint of one classic API
    #[must_use]
    pub fn endpoint(api: &str) -> Endpoint {
        Endpoint::new(KindTag::ClassicApi, format!("/api/config/v1/{api}"))
    }
}

#[async_trait]
impl ConfigDeployer for ClassicApiDeployer {
    fn kind(&self) -> KindTag {
        KindTag::ClassicApi
    }

    async fn deploy(
        &self,
        ctx: &DeployContext<'_>,
        object: &ConfigObject,
        properties: Properties,
    ) -> Result<ResolvedEntity, DeployError> {
        let api = match object.kind() {
            ConfigKind::ClassicApi { api } => api.as_str(),
            _ => object.coordinate().config_type(),
        };
        let name = required_str(&properties, "name")?.to_string();
        ctx.entities.claim_name(api, &name, object.coordinate())?;

        let id = match Self::upsert_named(ctx, object, api, &name, &properties).await {
            Ok(id) => id,
            Err(err) => {
                ctx.entities.release_name(api, &name, object.coordinate());
                return Err(err);
            }
        };

        Ok(ResolvedEntity::new(
            object.coordinate().clone(),
            id,
            display_name(object, &properties),
            properties,
        ))
    }
}

impl ClassicApiDeployer {
    async fn upsert_named(
        ctx: &DeployContext<'_>,
        object: &ConfigObject,
        api: &str,
        name: &str,
        properties: &Properties,
    ) -> Result<String, DeployError> {
        let endpoint = Self::endpoint(api);
        let listing = ctx.cache.list(ctx.client, &endpoint).await?;
        let existing = listing
            .iter()
            .find(|remote| remote.name.as_deref() == Some(name))
            .map(|remote| remote.id.clone());

        debug!(
            environment = ctx.environment,
            coordinate = %object.coordinate(),
            update = existing.is_some(),
            "upserting classic configuration"
        );

        let mut body = payload(object, properties)?;
        body.insert("name".to_string(), Value::String(name.to_string()));

        let remote = ctx
            .client
            .upsert(&endpoint, existing.as_deref(), Value::Object(body))
            .await?;
        ctx.cache.invalidate(&endpoint).await;
        Ok(remote.id)
    }
}
