// Resource kind descriptors for the generic list fetcher.
//
// Each kind names a fixed REST path and the item type its `{items: [...]}`
// envelope decodes into. Adding a kind is a type plus an impl; the fetch
// contract lives once in `ArgocdClient::fetch`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{Application, Cluster, nullable};

/// A list endpoint of the Argo CD API.
pub trait ResourceKind {
    /// Element type of the `items` array.
    type Item: DeserializeOwned + Serialize + Send + Sync + 'static;

    /// Path appended to the base URL, with a leading slash.
    const PATH: &'static str;

    /// Plural noun used in logs and error messages.
    const NAME: &'static str;
}

/// `GET /api/v1/applications`
#[derive(Debug, Clone, Copy)]
pub enum Applications {}

impl ResourceKind for Applications {
    type Item = Application;
    const PATH: &'static str = "/api/v1/applications";
    const NAME: &'static str = "applications";
}

/// `GET /api/v1/clusters`
#[derive(Debug, Clone, Copy)]
pub enum Clusters {}

impl ResourceKind for Clusters {
    type Item = Cluster;
    const PATH: &'static str = "/api/v1/clusters";
    const NAME: &'static str = "clusters";
}

/// The `{ "items": [...] }` envelope shared by every list endpoint.
///
/// Order is whatever the API returned. `"items": null` (an empty list on
/// the wire) decodes to an empty vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResourceList<T> {
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<T>,
}

impl<T> ResourceList<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> From<Vec<T>> for ResourceList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn null_items_decode_empty() {
        let list: ResourceList<Application> =
            serde_json::from_str(r#"{"metadata":{"resourceVersion":"1"},"items":null}"#).unwrap();
        assert!(list.is_empty());

        let list: ResourceList<Cluster> = serde_json::from_str("{}").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn items_must_be_an_array() {
        let result = serde_json::from_str::<ResourceList<Application>>(r#"{"items":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn paths_are_fixed() {
        assert_eq!(Applications::PATH, "/api/v1/applications");
        assert_eq!(Clusters::PATH, "/api/v1/clusters");
    }
}
