//! Vault agent HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p vaultd-agent --release
//!
//! # Run with a custom config path and port
//! vaultd-agent --config /etc/vaultd/agent.toml --port 9090
//!
//! # Configure logging level
//! RUST_LOG=vaultd=debug,info vaultd-agent
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `config.toml`)
//! - `HOST` - Override bind address
//! - `PORT` - Override port
//! - `RUST_LOG` - Log level filter (default: `info`)
//! - Signer keys referenced by `$VAR` in the config file

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use alloy_network::EthereumWallet;
use alloy_provider::ProviderBuilder;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use vaultd::ActionDispatcher;
use vaultd::submit::TransactionSubmitter;
use vaultd_evm::{EvmSubmitter, vault_registry};

use vaultd_agent::config::AgentConfig;
use vaultd_agent::session::InMemorySessionStore;
use vaultd_agent::{AgentState, agent_router};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Bind address, overriding the config file.
    #[arg(long, env = "HOST")]
    host: Option<IpAddr>,

    /// Port, overriding the config file.
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // .env first so clap's env fallbacks see it
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("Agent failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AgentConfig::load_from(&cli.config)?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::info!(?config, "Loaded configuration");

    let signer = config.signer()?;
    let signer_address = signer.address();
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(config.rpc_url.clone());

    let registry = vault_registry(config.actions())?;
    tracing::info!(
        vault = %config.vault_address,
        signer = %signer_address,
        actions = registry.len(),
        "Registered vault actions"
    );

    let submitter: Arc<dyn TransactionSubmitter> =
        Arc::new(EvmSubmitter::new(provider, config.submitter()));
    let dispatcher = ActionDispatcher::new(Arc::new(registry), submitter, config.dispatch());
    let sessions = InMemorySessionStore::with_capacity(config.session_capacity);
    let state = AgentState::new(dispatcher, Arc::new(sessions));

    let mut app = agent_router(state).layer(TraceLayer::new_for_http());
    if let Some(cors) = config.cors()? {
        app = app.layer(cors);
    }

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Agent listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Agent shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Cannot install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
        () = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
