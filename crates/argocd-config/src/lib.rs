//! Settings for the Argo CD MCP server.
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `ARGOCD_SERVER` / `ARGOCD_AUTH_TOKEN` / `ARGOCD_INSECURE`.
//! The result converts into an `argocd_api::TransportConfig`, which is
//! all the proxy core ever sees.

use std::fmt;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use argocd_api::TransportConfig;

pub const DEFAULT_SERVER: &str = "https://localhost:8080";
pub const DEFAULT_INSECURE: bool = true;

/// Value shipped in sample `.env` files; treated as "not configured".
pub const PLACEHOLDER_TOKEN: &str = "your-token-here";

const ENV_PREFIX: &str = "ARGOCD_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Effective connection settings after all layers are merged.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Control-plane base URL. Empty values fall back to the default.
    #[serde(default = "default_server", deserialize_with = "server")]
    pub server: String,

    /// Bearer token. Empty values count as unset.
    #[serde(default, deserialize_with = "token")]
    pub auth_token: Option<SecretString>,

    /// Skip TLS verification. Only the literal `true` enables it; an
    /// empty value means the default.
    #[serde(default = "default_insecure", deserialize_with = "insecure_flag")]
    pub insecure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: default_server(),
            auth_token: None,
            insecure: DEFAULT_INSECURE,
        }
    }
}

fn default_server() -> String {
    DEFAULT_SERVER.into()
}
fn default_insecure() -> bool {
    DEFAULT_INSECURE
}

/// How usable the configured token looks. Never blocks startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Missing,
    Placeholder,
    Present,
}

impl Settings {
    pub fn token_status(&self) -> TokenStatus {
        match self.auth_token {
            None => TokenStatus::Missing,
            Some(ref t) if t.expose_secret() == PLACEHOLDER_TOKEN => TokenStatus::Placeholder,
            Some(_) => TokenStatus::Present,
        }
    }

    /// Translate into the transport config consumed by `ArgocdClient`.
    pub fn transport(&self) -> Result<TransportConfig, ConfigError> {
        TransportConfig::new(&self.server, self.auth_token.clone(), self.insecure).map_err(|e| {
            ConfigError::Validation {
                field: "server".into(),
                reason: e.to_string(),
            }
        })
    }

    /// Render the effective settings as TOML with the token redacted.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        #[derive(Serialize)]
        struct Redacted<'a> {
            server: &'a str,
            auth_token: TokenStatus,
            insecure: bool,
        }

        Ok(toml::to_string_pretty(&Redacted {
            server: &self.server,
            auth_token: self.token_status(),
            insecure: self.insecure,
        })?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "argocd-mcp", "argocd-mcp").map_or_else(
        || PathBuf::from("argocd-mcp.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Keys whose env values are taken verbatim. figment's `Env` parses
/// values, which would turn a token like `007` into `7`.
const RAW_ENV_KEYS: [&str; 2] = ["server", "auth_token"];

/// Defaults, then the TOML file at `file` (skipped if absent), then env.
pub fn figment(file: &Path) -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::default("server", DEFAULT_SERVER))
        .merge(Serialized::default("insecure", DEFAULT_INSECURE))
        .merge(Toml::file(file))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&RAW_ENV_KEYS));

    for key in RAW_ENV_KEYS {
        let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        if let Ok(value) = std::env::var(&var) {
            figment = figment.merge(Serialized::default(key, value));
        }
    }
    figment
}

/// Load settings.
///
/// With an explicit `path` the file must exist; otherwise the platform
/// default location is tried and silently skipped when missing.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::MissingFile { path: p.to_owned() });
        }
        Some(p) => p.to_owned(),
        None => config_path(),
    };
    debug!(path = %file.display(), "loading settings");

    let settings: Settings = figment(&file).extract()?;

    match settings.token_status() {
        TokenStatus::Missing => {
            warn!("ARGOCD_AUTH_TOKEN is not set; requests will be sent unauthenticated");
        }
        TokenStatus::Placeholder => {
            warn!("ARGOCD_AUTH_TOKEN still holds the placeholder value; the API will reject it");
        }
        TokenStatus::Present => {}
    }

    Ok(settings)
}

// ── Lenient scalar parsing ──────────────────────────────────────────
//
// Env values arrive pre-parsed by figment, so "true" is a bool and a
// numeric token is a number. These visitors take any scalar back to the
// string semantics the variables are documented with.

struct ScalarString;

impl<'de> Visitor<'de> for ScalarString {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }
}

fn scalar<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    d.deserialize_any(ScalarString)
}

fn server<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(scalar(d)?
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_server))
}

fn token<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
    Ok(scalar(d)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

fn insecure_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match scalar(d)? {
        None => DEFAULT_INSECURE,
        Some(s) if s.is_empty() => DEFAULT_INSECURE,
        Some(s) => s == "true",
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn from_toml(src: &str) -> Settings {
        Figment::new()
            .merge(Serialized::default("server", DEFAULT_SERVER))
            .merge(Serialized::default("insecure", DEFAULT_INSECURE))
            .merge(Toml::string(src))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let s = from_toml("");
        assert_eq!(s.server, DEFAULT_SERVER);
        assert!(s.insecure);
        assert_eq!(s.token_status(), TokenStatus::Missing);
    }

    #[test]
    fn insecure_accepts_only_literal_true() {
        assert!(from_toml("insecure = true").insecure);
        assert!(from_toml("insecure = \"true\"").insecure);
        assert!(!from_toml("insecure = false").insecure);
        assert!(!from_toml("insecure = \"yes\"").insecure);
        assert!(!from_toml("insecure = 1").insecure);
        assert!(from_toml("insecure = \"\"").insecure);
    }

    #[test]
    fn numeric_token_is_kept_as_string() {
        let s = from_toml("auth_token = 12345");
        assert_eq!(s.auth_token.unwrap().expose_secret(), "12345");
    }

    #[test]
    fn placeholder_token_detected() {
        let s = from_toml("auth_token = \"your-token-here\"");
        assert_eq!(s.token_status(), TokenStatus::Placeholder);
        assert!(s.transport().unwrap().has_token());
    }

    #[test]
    fn redacted_toml_hides_token() {
        let s = from_toml("auth_token = \"super-secret\"\nserver = \"https://argocd.example.com\"");
        let rendered = s.to_redacted_toml().unwrap();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("auth_token = \"present\""));
        assert!(rendered.contains("server = \"https://argocd.example.com\""));
    }

    #[test]
    fn bad_server_fails_transport() {
        let s = from_toml("server = \"argocd.example.com\"");
        let err = s.transport().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));
    }

    #[test]
    fn debug_redacts_token() {
        let s = from_toml("auth_token = \"super-secret\"");
        assert!(!format!("{s:?}").contains("super-secret"));
    }
}
