#![allow(clippy::unwrap_used)]
// Layering tests for `load_settings` using figment's Jail sandbox.

use std::path::Path;

use figment::Jail;
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use argocd_api::TlsMode;
use argocd_config::{ConfigError, DEFAULT_SERVER, TokenStatus, load_settings};

fn clear_env(jail: &mut Jail) {
    jail.set_env("ARGOCD_SERVER", "");
    jail.set_env("ARGOCD_AUTH_TOKEN", "");
    jail.set_env("ARGOCD_INSECURE", "");
}

#[test]
fn empty_env_falls_back_to_defaults() {
    Jail::expect_with(|jail| {
        clear_env(jail);
        jail.create_file("argocd.toml", "")?;

        let settings = load_settings(Some(Path::new("argocd.toml"))).unwrap();
        assert_eq!(settings.server, DEFAULT_SERVER);
        assert!(settings.insecure);
        assert_eq!(settings.token_status(), TokenStatus::Missing);

        let transport = settings.transport().unwrap();
        assert_eq!(transport.tls, TlsMode::DangerAcceptInvalid);
        assert!(!transport.has_token());
        Ok(())
    });
}

#[test]
fn env_reads_all_three_variables() {
    Jail::expect_with(|jail| {
        jail.set_env("ARGOCD_SERVER", "https://argocd.prod.example.com");
        jail.set_env("ARGOCD_AUTH_TOKEN", "eyJhbGciOiJIUzI1NiJ9.payload.sig");
        jail.set_env("ARGOCD_INSECURE", "false");
        jail.create_file("argocd.toml", "")?;

        let settings = load_settings(Some(Path::new("argocd.toml"))).unwrap();
        assert_eq!(settings.server, "https://argocd.prod.example.com");
        assert!(!settings.insecure);
        assert_eq!(
            settings.auth_token.as_ref().unwrap().expose_secret(),
            "eyJhbGciOiJIUzI1NiJ9.payload.sig"
        );

        let transport = settings.transport().unwrap();
        assert_eq!(transport.tls, TlsMode::System);
        assert_eq!(transport.base(), "https://argocd.prod.example.com");
        Ok(())
    });
}

#[test]
fn env_overrides_file() {
    Jail::expect_with(|jail| {
        clear_env(jail);
        jail.create_file(
            "argocd.toml",
            r#"
                server = "https://from-file.example.com"
                auth_token = "file-token"
                insecure = false
            "#,
        )?;
        jail.set_env("ARGOCD_SERVER", "https://from-env.example.com");

        let settings = load_settings(Some(Path::new("argocd.toml"))).unwrap();
        assert_eq!(settings.server, "https://from-env.example.com");
        assert_eq!(settings.auth_token.unwrap().expose_secret(), "file-token");
        assert!(!settings.insecure);
        Ok(())
    });
}

#[test]
fn non_true_insecure_value_disables_skip_verify() {
    Jail::expect_with(|jail| {
        clear_env(jail);
        jail.set_env("ARGOCD_INSECURE", "yes");
        jail.create_file("argocd.toml", "")?;

        let settings = load_settings(Some(Path::new("argocd.toml"))).unwrap();
        assert!(!settings.insecure);
        Ok(())
    });
}

#[test]
fn explicit_missing_file_is_an_error() {
    Jail::expect_with(|jail| {
        clear_env(jail);
        let err = load_settings(Some(Path::new("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }), "{err:?}");
        Ok(())
    });
}

#[test]
fn numeric_looking_env_values_stay_verbatim() {
    Jail::expect_with(|jail| {
        clear_env(jail);
        jail.set_env("ARGOCD_AUTH_TOKEN", "007");
        jail.set_env("ARGOCD_SERVER", "https://argocd.example.com:0443");
        jail.create_file("argocd.toml", "")?;

        let settings = load_settings(Some(Path::new("argocd.toml"))).unwrap();
        assert_eq!(settings.auth_token.unwrap().expose_secret(), "007");
        assert_eq!(settings.server, "https://argocd.example.com:0443");
        Ok(())
    });
}

#[test]
fn token_that_parses_as_float_is_not_rewritten() {
    Jail::expect_with(|jail| {
        clear_env(jail);
        jail.set_env("ARGOCD_AUTH_TOKEN", "1e3");
        jail.create_file("argocd.toml", "")?;

        let settings = load_settings(Some(Path::new("argocd.toml"))).unwrap();
        assert_eq!(settings.auth_token.unwrap().expose_secret(), "1e3");
        Ok(())
    });
}
