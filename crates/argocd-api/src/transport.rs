// Shared transport configuration for building the reqwest::Client.
//
// Holds everything needed to reach the control plane: base URL, bearer
// credential, TLS trust mode, and the per-request timeout. Frozen once
// built; the client copies what it needs.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

/// Per-request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("argocd-mcp/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the built-in root certificate store.
    System,
    /// Accept any certificate (self-signed dev installs).
    DangerAcceptInvalid,
}

impl TlsMode {
    pub fn from_insecure(insecure: bool) -> Self {
        if insecure {
            Self::DangerAcceptInvalid
        } else {
            Self::System
        }
    }

    pub fn is_insecure(self) -> bool {
        matches!(self, Self::DangerAcceptInvalid)
    }
}

/// Connection settings for one Argo CD control plane.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: Url,
    /// Bearer token. `None` means requests go out unauthenticated.
    pub token: Option<SecretString>,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl TransportConfig {
    /// Validate the base URL and assemble a config with the default timeout.
    ///
    /// An empty token is treated the same as no token.
    pub fn new(base_url: &str, token: Option<SecretString>, insecure: bool) -> Result<Self, Error> {
        let base_url = Url::parse(base_url.trim())?;
        validate_base_url(&base_url)?;

        let token = token.filter(|t| !t.expose_secret().is_empty());

        Ok(Self {
            base_url,
            token,
            tls: TlsMode::from_insecure(insecure),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Base URL without a trailing slash, ready for `{base}{path}` joins.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// `Authorization` (when a token is set) and `Content-Type` are
    /// installed as default headers, so every request carries them.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(self.default_headers()?);

        match self.tls {
            TlsMode::System => {}
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    fn default_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref token) = self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| Error::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

pub(crate) fn validate_base_url(url: &Url) -> Result<(), Error> {
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl {
            url: url.to_string(),
            reason: "not a base URL",
        });
    }
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(Error::InvalidBaseUrl {
            url: url.to_string(),
            reason: "scheme must be http or https",
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_trims_trailing_slash() {
        let cfg = TransportConfig::new("https://argocd.example.com/", None, false).unwrap();
        assert_eq!(cfg.base(), "https://argocd.example.com");

        let cfg = TransportConfig::new("https://example.com/argocd/", None, false).unwrap();
        assert_eq!(cfg.base(), "https://example.com/argocd");
    }

    #[test]
    fn empty_token_is_no_token() {
        let cfg = TransportConfig::new(
            "https://localhost:8080",
            Some(SecretString::from(String::new())),
            true,
        )
        .unwrap();
        assert!(!cfg.has_token());
        assert_eq!(cfg.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = TransportConfig::new("ftp://argocd", None, true).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }), "{err:?}");

        let err = TransportConfig::new("mailto:ops@example.com", None, true).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }), "{err:?}");
    }

    #[test]
    fn rejects_unparseable_url() {
        let err = TransportConfig::new("", None, true).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)), "{err:?}");
    }

    #[test]
    fn token_header_is_sensitive() {
        let cfg = TransportConfig::new(
            "https://localhost:8080",
            Some(SecretString::from("s3cret".to_owned())),
            false,
        )
        .unwrap();
        let headers = cfg.default_headers().unwrap();
        let auth = headers.get(AUTHORIZATION).unwrap();
        assert!(auth.is_sensitive());
        assert_eq!(auth.to_str().unwrap(), "Bearer s3cret");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn invalid_token_never_echoed() {
        let cfg = TransportConfig::new(
            "https://localhost:8080",
            Some(SecretString::from("bad\ntoken".to_owned())),
            false,
        )
        .unwrap();
        let err = cfg.build_client().unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
        assert!(!err.to_string().contains("bad"));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = TransportConfig::new(
            "https://localhost:8080",
            Some(SecretString::from("s3cret".to_owned())),
            false,
        )
        .unwrap();
        assert!(!format!("{cfg:?}").contains("s3cret"));
    }
}
