//! Spreadsheet proxy server entrypoint.

use tracker_core::constants::DEFAULT_PORT;
use tracker_server::config::{env_flag_enabled, ProxyConfig};
use tracker_server::{resolve_bind_address, serve_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Used when `RUST_LOG` is unset. The binary logs under `tracker_proxy`.
const DEFAULT_LOG_FILTER: &str = "tracker_proxy=info,tracker_server=info,tower_http=warn";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if parse_cli_flags(&args)?.help {
        print_help();
        return Ok(());
    }

    let config = ProxyConfig::from_env();
    let state = AppState::new(config.clone())?;
    if let Err(err) = state.backend.ensure_ready() {
        tracing::warn!("{}; every request will fail until credentials are set", err);
    }

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    let bind_addr = resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!(
        "Sheets proxy ({} backend) running at http://{}/api/sheets",
        state.backend.name(),
        actual_addr
    );

    serve_router(listener, state, shutdown_signal()).await?;
    tracing::info!("Sheets proxy stopped");
    Ok(())
}

fn print_help() {
    println!("Creative Tracker sheets proxy\n");
    println!("Usage: tracker-proxy [OPTIONS]\n");
    println!("Options:");
    println!("  --help               Show this help message");
    println!("\nEnvironment variables:");
    println!("  PORT                 Server port (default: {})", DEFAULT_PORT);
    println!("  BIND                 Override bind address (e.g. 0.0.0.0:{})", DEFAULT_PORT);
    println!("  ALLOW_PUBLIC_ACCESS  Allow binding to non-loopback addresses");
    println!("  SHEETS_BACKEND       google (default) or memory");
    println!("  GOOGLE_SERVICE_ACCOUNT_EMAIL  Service account email (alias: G_EMAIL)");
    println!("  GOOGLE_PRIVATE_KEY   Service account PEM key, `\\n` escapes allowed (alias: G_KEY)");
    println!("  GOOGLE_ACCESS_TOKEN  Fixed OAuth bearer token, overrides the service account (alias: G_TOKEN)");
    println!("  GOOGLE_TOKEN_URI     OAuth token endpoint (default: https://oauth2.googleapis.com/token)");
    println!("  SHEETS_API_BASE      Sheets API root (default: https://sheets.googleapis.com/v4)");
    println!("  DRIVE_API_BASE       Drive API root (default: https://www.googleapis.com/drive/v3)");
    println!("  MAX_BODY_SIZE        Maximum request body in bytes (default: 1MiB)");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
