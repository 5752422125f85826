use super::{display_name, payload, ConfigDeployer, DeployContext};
use crate::client::Endpoint;
use crate::entity::{Properties, ResolvedEntity};
use crate::error::DeployError;
use async_trait::async_trait;
use cascade_core::{AutomationResource, ConfigKind, ConfigObject, Coordinate, KindTag};
use serde_json::Value;
use uuid::Uuid;

/// Namespace for coordinate-derived object ids
const ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_2a9e_5d4b_4f0a_9a3e_1b7c_d2e4_f608);

/// Platform objects whose id is a UUIDv5 of the coordinate
///
/// Handles automation resources, documents, segments and SLOs.
#[derive(Debug, Clone, Copy)]
pub struct UuidDeployer {
    kind: KindTag,
}

impl UuidDeployer {
    /// Deployer for one of the UUID-identified kinds
    ///
    /// Returns `None` for kinds identified differently.
    #[must_use]
    pub fn new(kind: KindTag) -> Option<Self> {
        matches!(
            kind,
            KindTag::Automation | KindTag::Document | KindTag::Segment | KindTag::Slo
        )
        .then_some(Self { kind })
    }

    /// Deterministic id of `coordinate`
    #[must_use]
    pub fn object_id(coordinate: &Coordinate) -> Uuid {
        Uuid::new_v5(&ID_NAMESPACE, coordinate.to_string().as_bytes())
    }

    fn endpoint(kind: &ConfigKind) -> Endpoint {
        let path = match kind {
            ConfigKind::Automation { resource } => match resource {
                AutomationResource::Workflow => "/platform/automation/v1/workflows",
                AutomationResource::BusinessCalendar => "/platform/automation/v1/business-calendars",
                AutomationResource::SchedulingRule => "/platform/automation/v1/scheduling-rules",
            },
            ConfigKind::Document { .. } => "/platform/document/v1/documents",
            ConfigKind::Slo => "/platform/slo/v1/slos",
            _ => "/platform/storage/filter-segments/v1/filter-segments",
        };
        Endpoint::new(kind.tag(), path)
    }
}

#[async_trait]
impl ConfigDeployer for UuidDeployer {
    fn kind(&self) -> KindTag {
        self.kind
    }

    async fn deploy(
        &self,
        ctx: &DeployContext<'_>,
        object: &ConfigObject,
        properties: Properties,
    ) -> Result<ResolvedEntity, DeployError> {
        let id = Self::object_id(object.coordinate()).to_string();
        let name = display_name(object, &properties);

        let mut body = payload(object, &properties)?;
        body.insert("id".to_string(), Value::String(id.clone()));
        if let ConfigKind::Document { kind } = object.kind() {
            body.insert("type".to_string(), Value::String(kind.as_str().to_string()));
            body.insert("name".to_string(), Value::String(name.clone()));
        }

        let remote = ctx
            .client
            .upsert(&Self::endpoint(object.kind()), Some(&id), Value::Object(body))
            .await?;

        Ok(ResolvedEntity::new(
            object.coordinate().clone(),
            remote.id,
            name,
            properties,
        ))
    }
}

/// Storage buckets, identified by a name derived from the coordinate
#[derive(Debug, Default, Clone, Copy)]
pub struct BucketDeployer;

impl BucketDeployer {
    /// Bucket name for `coordinate`: `<project>_<id>`, lower case, restricted charset
    #[must_use]
    pub fn bucket_name(coordinate: &Coordinate) -> String {
        format!("{}_{}", coordinate.project(), coordinate.config_id())
            .chars()
            .map(|c| {
                let c = c.to_ascii_lowercase();
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn endpoint() -> Endpoint {
        Endpoint::new(
            KindTag::Bucket,
            "/platform/storage/management/v1/bucket-definitions",
        )
    }
}

#[async_trait]
impl ConfigDeployer for BucketDeployer {
    fn kind(&self) -> KindTag {
        KindTag::Bucket
    }

    async fn deploy(
        &self,
        ctx: &DeployContext<'_>,
        object: &ConfigObject,
        properties: Properties,
    ) -> Result<ResolvedEntity, DeployError> {
        let bucket = Self::bucket_name(object.coordinate());

        let mut body = payload(object, &properties)?;
        body.insert("bucketName".to_string(), Value::String(bucket.clone()));

        let remote = ctx
            .client
            .upsert(&Self::endpoint(), Some(&bucket), Value::Object(body))
            .await?;

        Ok(ResolvedEntity::new(
            object.coordinate().clone(),
            remote.id,
            bucket,
            properties,
        ))
    }
}

/// OpenPipeline configurations, one per pipeline kind
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenPipelineDeployer;

#[async_trait]
impl ConfigDeployer for OpenPipelineDeployer {
    fn kind(&self) -> KindTag {
        KindTag::OpenPipeline
    }

    async fn deploy(
        &self,
        ctx: &DeployContext<'_>,
        object: &ConfigObject,
        properties: Properties,
    ) -> Result<ResolvedEntity, DeployError> {
        let pipeline = match object.kind() {
            ConfigKind::OpenPipeline { kind } => kind.clone(),
            _ => object.coordinate().config_id().to_string(),
        };
        let endpoint = Endpoint::new(
            KindTag::OpenPipeline,
            "/platform/openpipeline/v1/configurations",
        );

        let mut body = payload(object, &properties)?;
        body.insert("id".to_string(), Value::String(pipeline.clone()));

        let remote = ctx
            .client
            .upsert(&endpoint, Some(&pipeline), Value::Object(body))
            .await?;

        Ok(ResolvedEntity::new(
            object.coordinate().clone(),
            remote.id,
            pipeline,
            properties,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ListingCache;
    use crate::deployers::tests::object;
    use crate::entity::EntityMap;
    use crate::memory::InMemoryClient;
    use cascade_core::DocumentKind;

    async fn deploy_twice(
        deployer: &dyn ConfigDeployer,
        object: &ConfigObject,
    ) -> (ResolvedEntity, ResolvedEntity, InMemoryClient) {
        let client = InMemoryClient::new();
        let cache = ListingCache::default();
        let entities = EntityMap::new();
        let ctx = DeployContext {
            environment: "dev",
            client: &client,
            cache: &cache,
            entities: &entities,
        };
        let first = deployer
            .deploy(&ctx, object, Properties::new())
            .await
            .unwrap();
        let second = deployer
            .deploy(&ctx, object, Properties::new())
            .await
            .unwrap();
        (first, second, client)
    }

    #[test]
    fn uuid_deployer_only_for_uuid_kinds() {
        assert!(UuidDeployer::new(KindTag::Slo).is_some());
        assert!(UuidDeployer::new(KindTag::Document).is_some());
        assert!(UuidDeployer::new(KindTag::Bucket).is_none());
        assert!(UuidDeployer::new(KindTag::ClassicApi).is_none());
    }

    #[tokio::test]
    async fn uuid_ids_are_stable() {
        let document = object(
            ConfigKind::Document {
                kind: DocumentKind::Notebook,
            },
            "nb",
        );
        let deployer = UuidDeployer::new(KindTag::Document).unwrap();
        let (first, second, client) = deploy_twice(&deployer, &document).await;

        assert_eq!(first.id(), second.id());
        assert_eq!(
            first.id().map(ToString::to_string),
            Some(UuidDeployer::object_id(document.coordinate()).to_string())
        );
        assert_eq!(client.len(), 1);
    }

    #[test]
    fn bucket_names_are_sanitized() {
        let name = BucketDeployer::bucket_name(&Coordinate::new("My.Project", "bucket", "Logs 1"));
        assert_eq!(name, "my_project_logs_1");
    }

    #[tokio::test]
    async fn bucket_and_pipeline_ids() {
        let bucket = object(ConfigKind::Bucket, "logs");
        let (entity, _, _) = deploy_twice(&BucketDeployer, &bucket).await;
        assert_eq!(entity.id(), Some("p_logs"));

        let pipeline = object(
            ConfigKind::OpenPipeline {
                kind: "events".into(),
            },
            "ev",
        );
        let (entity, _, client) = deploy_twice(&OpenPipelineDeployer, &pipeline).await;
        assert_eq!(entity.id(), Some("events"));
        assert_eq!(client.len(), 1);
    }
}
