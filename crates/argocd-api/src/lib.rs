// argocd-api: Async read-only client for the Argo CD REST API

pub mod client;
pub mod error;
pub mod models;
pub mod resource;
pub mod transport;

pub use client::ArgocdClient;
pub use error::Error;
pub use models::{Application, ApplicationList, Cluster, ClusterList};
pub use resource::{Applications, Clusters, ResourceKind, ResourceList};
pub use transport::{TlsMode, TransportConfig};
