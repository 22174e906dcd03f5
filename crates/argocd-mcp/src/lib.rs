//! MCP server exposing Argo CD applications and clusters as read-only
//! resources.
//!
//! [`McpSession`] speaks JSON-RPC over any line-oriented stream and
//! dispatches `resources/*` calls to [`ResourceHandlers`], which proxy
//! to the Argo CD REST API through `argocd_api::ArgocdClient`.

pub mod error;
pub mod protocol;
pub mod resources;
pub mod stats;

pub use error::{AppError, ResourceError};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, McpSession};
pub use resources::{
    ArgocdResource, MIME_JSON, ReadResourceResult, ResourceContents, ResourceDescriptor,
    ResourceHandlers,
};
pub use stats::{RequestStats, StatsSnapshot};
