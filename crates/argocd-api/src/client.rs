// Read-only async HTTP client for the Argo CD REST API.
//
// Auth: `Authorization: Bearer <token>` default header (optional).
// One GET per call, no retry. Every fetch races the caller's
// cancellation token; losing the race drops the in-flight request.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ApplicationList, ClusterList};
use crate::resource::{Applications, Clusters, ResourceKind, ResourceList};
use crate::transport::{TransportConfig, validate_base_url};

/// Async client for the Argo CD list endpoints.
///
/// Cheap to share behind an `Arc`; holds no per-call state.
#[derive(Debug, Clone)]
pub struct ArgocdClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArgocdClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build the shared HTTP client from a transport config.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        debug!(
            base_url = transport.base(),
            authenticated = transport.has_token(),
            insecure = transport.tls.is_insecure(),
            "argocd client ready"
        );
        Ok(Self {
            http,
            base_url: transport.base().to_owned(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let url = Url::parse(base_url.trim())?;
        validate_base_url(&url)?;
        Ok(Self {
            http,
            base_url: url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}{path}`; `path` carries its own leading slash.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    // ── Generic fetch ────────────────────────────────────────────────

    /// Fetch the full list for resource kind `K`.
    ///
    /// Returns [`Error::Cancelled`] as soon as `cancel` fires, even with
    /// the request still in flight.
    pub async fn fetch<K: ResourceKind>(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ResourceList<K::Item>, Error> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(resource = K::NAME, "fetch cancelled");
                Err(Error::Cancelled)
            }
            result = self.get::<ResourceList<K::Item>>(K::PATH) => result,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET /api/v1/applications`
    pub async fn list_applications(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ApplicationList, Error> {
        self.fetch::<Applications>(cancel).await
    }

    /// `GET /api/v1/clusters`
    pub async fn list_clusters(&self, cancel: &CancellationToken) -> Result<ClusterList, Error> {
        self.fetch::<Clusters>(cancel).await
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Anything but 200 is an API error carrying the raw body; a 200 body
/// must decode completely or the whole call fails.
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body_len = body.len(), "argocd API error");
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }

    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(Error::Decode)
}
