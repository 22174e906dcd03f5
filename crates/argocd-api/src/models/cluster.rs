// ── Cluster types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::nullable;

/// A registered execution cluster the control plane can deploy into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// API server URL.
    #[serde(deserialize_with = "nullable")]
    pub server: String,
    #[serde(rename = "config", deserialize_with = "nullable")]
    pub connection_config: ClusterConfig,
    #[serde(deserialize_with = "nullable")]
    pub connection_state: ConnectionState,
    #[serde(deserialize_with = "nullable")]
    pub server_version: String,
    #[serde(deserialize_with = "nullable")]
    pub info: ClusterInfo,
}

impl Cluster {
    /// `Successful`, `Failed`, or `Unknown` (empty if never reported).
    pub fn connection_status(&self) -> &str {
        &self.connection_state.status
    }

    pub fn applications_count(&self) -> i64 {
        self.info.applications_count
    }
}

/// Connection settings of a cluster, carried through untouched.
///
/// Holds `bearerToken`, `tlsClientConfig`, `awsAuthConfig`,
/// `execProviderConfig` and whatever else the control plane adds later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterConfig(pub Map<String, Value>);

impl ClusterConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn tls_client_config(&self) -> Option<&Value> {
        self.get("tlsClientConfig")
    }

    pub fn aws_auth_config(&self) -> Option<&Value> {
        self.get("awsAuthConfig")
    }

    pub fn exec_provider_config(&self) -> Option<&Value> {
        self.get("execProviderConfig")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionState {
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    /// Last time the connection state changed (RFC 3339).
    #[serde(rename = "attemptedAt", skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterInfo {
    #[serde(deserialize_with = "nullable")]
    pub applications_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub server_version: String,
    #[serde(deserialize_with = "nullable")]
    pub cache_info: ClusterCacheInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterCacheInfo {
    #[serde(deserialize_with = "nullable")]
    pub resources_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub apis_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cache_sync_time: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn in_cluster() -> Value {
        json!({
            "server": "https://kubernetes.default.svc",
            "name": "in-cluster",
            "config": {
                "tlsClientConfig": { "insecure": false, "caData": "LS0tLS1CRUdJTg==" },
                "execProviderConfig": {
                    "command": "argocd-k8s-auth",
                    "args": ["aws", "--cluster-name", "prod"],
                    "apiVersion": "client.authentication.k8s.io/v1beta1"
                }
            },
            "connectionState": {
                "status": "Successful",
                "message": "",
                "attemptedAt": "2024-05-01T12:00:00Z"
            },
            "serverVersion": "1.29",
            "info": {
                "connectionState": { "status": "Successful" },
                "serverVersion": "1.29",
                "cacheInfo": {
                    "resourcesCount": 812,
                    "apisCount": 64,
                    "lastCacheSyncTime": "2024-05-01T11:58:00Z"
                },
                "applicationsCount": 7
            }
        })
    }

    #[test]
    fn decodes_cluster() {
        let cluster: Cluster = serde_json::from_value(in_cluster()).unwrap();

        assert_eq!(cluster.name, "in-cluster");
        assert_eq!(cluster.server, "https://kubernetes.default.svc");
        assert_eq!(cluster.connection_status(), "Successful");
        assert_eq!(
            cluster.connection_state.modified_at.as_deref(),
            Some("2024-05-01T12:00:00Z")
        );
        assert_eq!(cluster.server_version, "1.29");
        assert_eq!(cluster.applications_count(), 7);
        assert_eq!(cluster.info.cache_info.resources_count, 812);
        assert_eq!(cluster.info.cache_info.apis_count, 64);
    }

    #[test]
    fn config_passes_through_verbatim() {
        let raw = in_cluster();
        let cluster: Cluster = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(
            cluster.connection_config.exec_provider_config(),
            Some(&raw["config"]["execProviderConfig"])
        );
        assert!(cluster.connection_config.aws_auth_config().is_none());

        let encoded = serde_json::to_value(&cluster).unwrap();
        assert_eq!(encoded["config"], raw["config"]);
    }

    #[test]
    fn null_config_and_info_decode_empty() {
        let cluster: Cluster = serde_json::from_value(json!({
            "server": "https://10.0.0.1:6443",
            "config": null,
            "info": null
        }))
        .unwrap();

        assert!(cluster.connection_config.is_empty());
        assert_eq!(cluster.info, ClusterInfo::default());
        assert_eq!(cluster.connection_status(), "");
    }

    #[test]
    fn fractional_count_is_an_error() {
        let result = serde_json::from_value::<Cluster>(json!({
            "info": { "applicationsCount": 1.5 }
        }));
        assert!(result.is_err());
    }
}
