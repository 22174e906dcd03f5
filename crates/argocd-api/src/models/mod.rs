//! Argo CD response types for the read-only resource endpoints.
//!
//! Field names follow the control plane's JSON (camelCase) so a decoded
//! list re-encodes to the same document. Missing and `null` fields decode
//! to their empty value; nothing else is filled in locally.

mod application;
mod cluster;

use serde::{Deserialize, Deserializer};

pub use application::{
    Application, ApplicationDestination, ApplicationSource, ApplicationSpec, ApplicationStatus,
    HealthStatus, ObjectMeta, SyncStatus,
};
pub use cluster::{Cluster, ClusterCacheInfo, ClusterConfig, ClusterInfo, ConnectionState};

use crate::resource::ResourceList;

/// `GET /api/v1/applications` response body.
pub type ApplicationList = ResourceList<Application>;

/// `GET /api/v1/clusters` response body.
pub type ClusterList = ResourceList<Cluster>;

/// Decode `null` as the type's default instead of failing.
///
/// The control plane emits `null` for unset slices and objects.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
