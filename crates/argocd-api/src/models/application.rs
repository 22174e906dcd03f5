// ── Application types ──
//
// Subset of `v1alpha1.Application` needed to describe where an app comes
// from, where it deploys, and whether it is in sync and healthy.

use serde::{Deserialize, Serialize};

use super::nullable;

/// One GitOps-managed deployment as reported at fetch time.
///
/// Identity is `(namespace, name)`; values are rebuilt on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    #[serde(deserialize_with = "nullable")]
    pub metadata: ObjectMeta,
    #[serde(deserialize_with = "nullable")]
    pub spec: ApplicationSpec,
    #[serde(deserialize_with = "nullable")]
    pub status: ApplicationStatus,
}

impl Application {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn project(&self) -> &str {
        &self.spec.project
    }

    /// `Synced`, `OutOfSync`, or `Unknown` (empty if never reported).
    pub fn sync_status(&self) -> &str {
        &self.status.sync.status
    }

    /// `Healthy`, `Progressing`, `Degraded`, `Suspended`, `Missing`, or `Unknown`.
    pub fn health_status(&self) -> &str {
        &self.status.health.status
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectMeta {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSpec {
    #[serde(deserialize_with = "nullable")]
    pub project: String,
    #[serde(deserialize_with = "nullable")]
    pub source: ApplicationSource,
    #[serde(deserialize_with = "nullable")]
    pub destination: ApplicationDestination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationSource {
    #[serde(rename = "repoURL", deserialize_with = "nullable")]
    pub repo_url: String,
    #[serde(deserialize_with = "nullable")]
    pub path: String,
    #[serde(deserialize_with = "nullable")]
    pub target_revision: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDestination {
    /// API server URL of the target cluster.
    #[serde(deserialize_with = "nullable")]
    pub server: String,
    #[serde(deserialize_with = "nullable")]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationStatus {
    #[serde(deserialize_with = "nullable")]
    pub sync: SyncStatus,
    #[serde(deserialize_with = "nullable")]
    pub health: HealthStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncStatus {
    #[serde(deserialize_with = "nullable")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    #[serde(deserialize_with = "nullable")]
    pub status: String,
}
