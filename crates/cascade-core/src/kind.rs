//! Configuration kinds
//!
//! [`ConfigKind`] is the closed set of configuration families the platform
//! accepts. [`KindTag`] is its field-less discriminant, used as the key of
//! deployer and client lookup tables.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of a configuration object, with the data its deployer needs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ConfigKind {
    /// Classic configuration API, one endpoint per `api`
    ClassicApi {
        /// API name, e.g. `dashboard`, `alerting-profile`
        api: String,
    },

    /// Settings 2.0 object of a schema
    Settings {
        /// Schema identifier, e.g. `builtin:tags.auto-tagging`
        schema_id: String,
        /// Schema version, if pinned
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema_version: Option<String>,
    },

    /// Automation resource
    Automation {
        /// Resource kind
        resource: AutomationResource,
    },

    /// Grail storage bucket
    Bucket,

    /// Document
    Document {
        /// Document kind
        #[serde(default)]
        kind: DocumentKind,
    },

    /// OpenPipeline configuration, one per pipeline kind
    OpenPipeline {
        /// Pipeline kind, e.g. `logs`, `events`
        kind: String,
    },

    /// Filter segment
    Segment,

    /// Service-level objective
    Slo,
}

impl ConfigKind {
    /// Discriminant of this kind
    #[must_use]
    pub fn tag(&self) -> KindTag {
        match self {
            Self::ClassicApi { .. } => KindTag::ClassicApi,
            Self::Settings { .. } => KindTag::Settings,
            Self::Automation { .. } => KindTag::Automation,
            Self::Bucket => KindTag::Bucket,
            Self::Document { .. } => KindTag::Document,
            Self::OpenPipeline { .. } => KindTag::OpenPipeline,
            Self::Segment => KindTag::Segment,
            Self::Slo => KindTag::Slo,
        }
    }

    /// Stable type identifier used as the coordinate type
    ///
    /// Classic APIs use the API name, settings the schema id; automation
    /// and document kinds use their sub-kind.
    #[must_use]
    pub fn type_id(&self) -> String {
        match self {
            Self::ClassicApi { api } => api.clone(),
            Self::Settings { schema_id, .. } => schema_id.clone(),
            Self::Automation { resource } => resource.as_str().to_string(),
            Self::Bucket => "bucket".to_string(),
            Self::Document { kind } => kind.as_str().to_string(),
            Self::OpenPipeline { kind } => format!("openpipeline:{kind}"),
            Self::Segment => "segment".to_string(),
            Self::Slo => "slo-v2".to_string(),
        }
    }
}

/// Field-less discriminant of [`ConfigKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KindTag {
    /// Classic configuration API
    ClassicApi,
    /// Settings 2.0
    Settings,
    /// Automation
    Automation,
    /// Bucket
    Bucket,
    /// Document
    Document,
    /// OpenPipeline
    OpenPipeline,
    /// Segment
    Segment,
    /// Service-level objective
    Slo,
}

impl KindTag {
    /// Every tag, in declaration order
    pub const ALL: [KindTag; 8] = [
        KindTag::ClassicApi,
        KindTag::Settings,
        KindTag::Automation,
        KindTag::Bucket,
        KindTag::Document,
        KindTag::OpenPipeline,
        KindTag::Segment,
        KindTag::Slo,
    ];

    /// Kebab-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClassicApi => "classic-api",
            Self::Settings => "settings",
            Self::Automation => "automation",
            Self::Bucket => "bucket",
            Self::Document => "document",
            Self::OpenPipeline => "open-pipeline",
            Self::Segment => "segment",
            Self::Slo => "slo",
        }
    }
}

impl Display for KindTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automation resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutomationResource {
    /// Workflow
    Workflow,
    /// Business calendar
    BusinessCalendar,
    /// Scheduling rule
    SchedulingRule,
}

impl AutomationResource {
    /// Kebab-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::BusinessCalendar => "business-calendar",
            Self::SchedulingRule => "scheduling-rule",
        }
    }
}

/// Document kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Dashboard document
    #[default]
    Dashboard,
    /// Notebook document
    Notebook,
    /// Launchpad document
    Launchpad,
}

impl DocumentKind {
    /// Kebab-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "document-dashboard",
            Self::Notebook => "document-notebook",
            Self::Launchpad => "document-launchpad",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_matches_variant() {
        let kinds = [
            ConfigKind::ClassicApi {
                api: "dashboard".into(),
            },
            ConfigKind::Settings {
                schema_id: "builtin:x".into(),
                schema_version: None,
            },
            ConfigKind::Automation {
                resource: AutomationResource::Workflow,
            },
            ConfigKind::Bucket,
            ConfigKind::Document {
                kind: DocumentKind::Notebook,
            },
            ConfigKind::OpenPipeline {
                kind: "logs".into(),
            },
            ConfigKind::Segment,
            ConfigKind::Slo,
        ];

        let tags: Vec<KindTag> = kinds.iter().map(ConfigKind::tag).collect();
        assert_eq!(tags, KindTag::ALL.to_vec());
    }

    #[test]
    fn type_ids() {
        assert_eq!(
            ConfigKind::ClassicApi {
                api: "dashboard".into()
            }
            .type_id(),
            "dashboard"
        );
        assert_eq!(
            ConfigKind::Settings {
                schema_id: "builtin:tags.auto-tagging".into(),
                schema_version: Some("1.0".into())
            }
            .type_id(),
            "builtin:tags.auto-tagging"
        );
        assert_eq!(
            ConfigKind::Automation {
                resource: AutomationResource::SchedulingRule
            }
            .type_id(),
            "scheduling-rule"
        );
        assert_eq!(
            ConfigKind::OpenPipeline {
                kind: "logs".into()
            }
            .type_id(),
            "openpipeline:logs"
        );
    }

    #[test]
    fn kind_serde_shape() {
        let kind: ConfigKind = serde_json::from_value(json!({
            "type": "settings",
            "schema_id": "builtin:alerting.profile"
        }))
        .unwrap();

        assert_eq!(
            kind,
            ConfigKind::Settings {
                schema_id: "builtin:alerting.profile".into(),
                schema_version: None
            }
        );

        let document: ConfigKind = serde_json::from_value(json!({ "type": "document" })).unwrap();
        assert_eq!(
            document,
            ConfigKind::Document {
                kind: DocumentKind::Dashboard
            }
        );
    }
}
