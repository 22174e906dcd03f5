//! Error types for resource reads and for the server process.

use miette::Diagnostic;
use thiserror::Error;

use argocd_config::ConfigError;

/// Failure of a single resource read, as reported to the MCP client.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The upstream fetch failed. Carries the fetch error unchanged.
    #[error("failed to get ArgoCD {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: argocd_api::Error,
    },

    #[error("failed to marshal {resource}: {source}")]
    Encode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown resource URI: {uri}")]
    UnknownResource { uri: String },
}

impl ResourceError {
    /// Upstream HTTP status, when the control plane answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Fetch {
                source: argocd_api::Error::Cancelled,
                ..
            }
        )
    }
}

/// Fatal startup and transport errors for the binary, rendered with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum AppError {
    #[error("configuration error")]
    #[diagnostic(
        code(argocd_mcp::config),
        help(
            "Check ARGOCD_SERVER, ARGOCD_AUTH_TOKEN and ARGOCD_INSECURE,\n\
             or the file passed with --config."
        )
    )]
    Config(#[from] ConfigError),

    #[error("could not build the Argo CD client")]
    #[diagnostic(code(argocd_mcp::client))]
    Client(#[from] argocd_api::Error),

    #[error("stdio transport failed")]
    #[diagnostic(code(argocd_mcp::io))]
    Io(#[from] std::io::Error),
}
