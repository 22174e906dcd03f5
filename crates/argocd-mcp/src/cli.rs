//! Command-line flags for the `argocd-mcp` binary.

use std::path::PathBuf;

use clap::Parser;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// argocd-mcp -- Argo CD resources for MCP clients
#[derive(Debug, Parser)]
#[command(
    name = "argocd-mcp",
    version,
    about = "Serve Argo CD applications and clusters to MCP clients over stdio",
    long_about = "Speaks MCP (JSON-RPC 2.0) on stdin/stdout and exposes two read-only\n\
        resources, argocd://applications and argocd://clusters.\n\n\
        Connection settings come from ARGOCD_SERVER, ARGOCD_AUTH_TOKEN and\n\
        ARGOCD_INSECURE, layered over an optional TOML config file."
)]
pub struct Cli {
    /// Config file path (default: platform config dir)
    #[arg(long, short = 'c', env = "ARGOCD_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Argo CD server URL, overriding config and environment
    #[arg(long, short = 's')]
    pub server: Option<String>,

    /// Print the effective settings (token redacted) and exit
    #[arg(long)]
    pub check_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["argocd-mcp", "-vv", "--server", "https://argocd.local"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.server.as_deref(), Some("https://argocd.local"));
        assert!(!cli.check_config);
    }
}
