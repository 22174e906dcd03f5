mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use argocd_api::ArgocdClient;
use argocd_mcp::protocol::{SERVER_NAME, SERVER_VERSION};
use argocd_mcp::{AppError, McpSession, RequestStats, ResourceHandlers};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            1
        }
    };
    // A pending stdin read cannot be cancelled and would block runtime shutdown.
    std::process::exit(code);
}

/// Logs go to stderr; stdout carries the protocol.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = argocd_config::load_settings(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        settings.server = server;
    }

    if cli.check_config {
        print!("{}", settings.to_redacted_toml()?);
        return Ok(());
    }

    let transport = settings.transport()?;
    let client = ArgocdClient::new(&transport)?;
    let stats = Arc::new(RequestStats::new());
    let session = McpSession::new(ResourceHandlers::new(Arc::new(client), Arc::clone(&stats)));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("interrupt received, shutting down");
                    cancel.cancel();
                }
                Err(e) => warn!(error = %e, "failed to listen for interrupt"),
            }
        }
    });

    info!(
        name = SERVER_NAME,
        version = SERVER_VERSION,
        server = transport.base(),
        insecure = transport.tls.is_insecure(),
        "serving MCP on stdio"
    );

    let result = session
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), &cancel)
        .await;

    let snapshot = stats.snapshot();
    info!(
        started = %snapshot.start_time,
        requests = snapshot.request_count,
        last_request = ?snapshot.last_request,
        "MCP server stopped"
    );

    result?;
    Ok(())
}
