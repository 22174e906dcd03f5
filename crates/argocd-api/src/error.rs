use thiserror::Error;

/// Top-level error type for the `argocd-api` crate.
///
/// Fetch failures fall into three classes: the request never completed
/// (`Transport`, `Cancelled`), the control plane answered with something
/// other than 200 (`Api`), or the 200 body did not decode (`Decode`).
/// The remaining variants can only occur while building a client.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller cancelled the request before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    // ── API ─────────────────────────────────────────────────────────
    /// Non-200 response. The body is kept verbatim for diagnostics.
    #[error("ArgoCD API returned status {status}: {body}")]
    Api { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The 200 response body was not the expected JSON shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    // ── Construction ────────────────────────────────────────────────
    /// Base URL did not parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base URL parsed but cannot serve as an HTTP base.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: &'static str },

    /// The bearer token contains bytes that are not legal in a header.
    /// The token itself is never included.
    #[error("auth token is not a valid HTTP header value")]
    InvalidToken,

    /// TLS setup or client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// Returns `true` if the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Cancelled)
    }

    /// Returns `true` if the control plane rejected the credentials.
    ///
    /// Informational only: 401/403 are still plain [`Error::Api`] values.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// HTTP status preserved from the response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
