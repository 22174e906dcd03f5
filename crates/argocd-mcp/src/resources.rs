//! MCP resource handlers.
//!
//! Two read-only resources backed by the Argo CD API:
//! - `argocd://applications` - every application the token can see
//! - `argocd://clusters` - every registered cluster
//!
//! Each read counts toward [`RequestStats`], performs one fetch, and
//! returns the `{items: [...]}` list as pretty-printed JSON.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use argocd_api::{Applications, ArgocdClient, Clusters, ResourceKind};

use crate::error::ResourceError;
use crate::stats::RequestStats;

pub const MIME_JSON: &str = "application/json";

/// A [`ResourceKind`] published to MCP clients under a fixed URI.
pub trait ArgocdResource: ResourceKind {
    const URI: &'static str;
    /// Human-readable name shown in `resources/list`.
    const TITLE: &'static str;
    const DESCRIPTION: &'static str;
}

impl ArgocdResource for Applications {
    const URI: &'static str = "argocd://applications";
    const TITLE: &'static str = "ArgoCD Applications";
    const DESCRIPTION: &'static str = "List of all ArgoCD applications";
}

impl ArgocdResource for Clusters {
    const URI: &'static str = "argocd://clusters";
    const TITLE: &'static str = "ArgoCD Clusters";
    const DESCRIPTION: &'static str = "List of all clusters registered with ArgoCD";
}

// ── Wire types ──────────────────────────────────────────────────────

/// Entry in a `resources/list` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

impl ResourceDescriptor {
    pub fn of<R: ArgocdResource>() -> Self {
        Self {
            uri: R::URI,
            name: R::TITLE,
            description: R::DESCRIPTION,
            mime_type: MIME_JSON,
        }
    }
}

/// One text content block of a `resources/read` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// `resources/read` result body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

// ── Handlers ────────────────────────────────────────────────────────

/// Resource handlers sharing one client and one stats counter.
///
/// Cheap to clone; safe to call from concurrent tasks.
#[derive(Debug, Clone)]
pub struct ResourceHandlers {
    client: Arc<ArgocdClient>,
    stats: Arc<RequestStats>,
}

impl ResourceHandlers {
    pub fn new(client: Arc<ArgocdClient>, stats: Arc<RequestStats>) -> Self {
        Self { client, stats }
    }

    pub fn stats(&self) -> &Arc<RequestStats> {
        &self.stats
    }

    /// Descriptors for every registered resource.
    pub fn list() -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor::of::<Applications>(),
            ResourceDescriptor::of::<Clusters>(),
        ]
    }

    pub fn is_registered(uri: &str) -> bool {
        uri == Applications::URI || uri == Clusters::URI
    }

    /// Dispatch a read by URI. Unknown URIs are not counted as served.
    pub async fn read(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<ReadResourceResult, ResourceError> {
        if uri == Applications::URI {
            self.handle::<Applications>(cancel).await
        } else if uri == Clusters::URI {
            self.handle::<Clusters>(cancel).await
        } else {
            Err(ResourceError::UnknownResource {
                uri: uri.to_owned(),
            })
        }
    }

    pub async fn read_applications(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ReadResourceResult, ResourceError> {
        self.handle::<Applications>(cancel).await
    }

    pub async fn read_clusters(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ReadResourceResult, ResourceError> {
        self.handle::<Clusters>(cancel).await
    }

    /// Count, fetch, re-encode. A failed fetch is still a served request.
    pub async fn handle<R: ArgocdResource>(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ReadResourceResult, ResourceError> {
        let served = self.stats.record();
        debug!(uri = R::URI, request = served, "reading resource");

        let list = self.client.fetch::<R>(cancel).await.map_err(|source| {
            warn!(uri = R::URI, error = %source, "resource fetch failed");
            ResourceError::Fetch {
                resource: R::NAME,
                source,
            }
        })?;

        let text = serde_json::to_string_pretty(&list).map_err(|source| ResourceError::Encode {
            resource: R::NAME,
            source,
        })?;
        debug!(uri = R::URI, items = list.len(), bytes = text.len(), "resource read");

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: R::URI.to_owned(),
                mime_type: MIME_JSON.to_owned(),
                text,
            }],
        })
    }
}
