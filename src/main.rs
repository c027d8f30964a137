//! Zwift racing API entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use zwift_racing_api::api::{create_router, AppState};
use zwift_racing_api::config::Config;
use zwift_racing_api::credentials::{Credentials, KeyringStore};
use zwift_racing_api::metrics;
use zwift_racing_api::startup;
use zwift_racing_api::utils::shutdown_signal;
use zwift_racing_api::zwiftpower::{ZwiftFetch, ZwiftPowerClient};
use zwift_racing_api::ServiceError;

/// HTTP API for ZwiftPower rider and team data.
#[derive(Parser, Debug)]
#[command(name = "zwift-racing-api")]
#[command(about = "Serve ZwiftPower rider and team data over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,

        /// HTTP server port.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration and keyring credentials.
    CheckConfig,

    /// Store ZwiftPower credentials in the system keyring.
    SetCredentials {
        /// ZwiftPower username (email).
        #[arg(short, long)]
        username: String,

        /// ZwiftPower password.
        #[arg(long, env = "ZWIFTPOWER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Fetch one rider and print it as JSON.
    Rider {
        /// Zwift account id.
        zwift_id: i64,
    },

    /// Fetch one team and print it as JSON.
    Team {
        /// ZwiftPower team id.
        team_id: i64,

        /// Print only the riders list.
        #[arg(long)]
        riders: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    config.verbose |= args.verbose;

    init_logging(&config);

    match args.command {
        Some(Command::Serve { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port.or(args.port) {
                config.port = port;
            }
            cmd_serve(config).await
        }
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::SetCredentials { username, password }) => {
            cmd_set_credentials(&config, username, password)
        }
        Some(Command::Rider { zwift_id }) => cmd_rider(&config, zwift_id).await,
        Some(Command::Team { team_id, riders }) => cmd_team(&config, team_id, riders).await,
        None => {
            if let Some(port) = args.port {
                config.port = port;
            }
            cmd_serve(config).await
        }
    }
}

fn init_logging(config: &Config) {
    let filter = if config.verbose {
        EnvFilter::new("zwift_racing_api=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    let fmt_layer = if config.log_json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
}

/// Validate config and load keyring credentials; both are fatal when they fail.
fn startup_client(config: &Config) -> anyhow::Result<ZwiftPowerClient> {
    Ok(startup::build_client(config, &KeyringStore::new())?)
}

/// Run the HTTP server.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let client = startup_client(&config)?;

    let mut state = AppState::new(Arc::new(client));
    if config.metrics_enabled {
        let handle = metrics::install_recorder().map_err(ServiceError::from)?;
        state = state.with_metrics(handle);
    }

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Zwift Racing API listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ZWIFT RACING API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Checking keyring credentials... ");
    match Credentials::load(&KeyringStore::new(), &config.keyring_service) {
        Ok(creds) => {
            println!("OK");
            println!("  Username: {}", creds.username());
        }
        Err(e) => {
            println!("FAILED");
            println!("{}", e);
            return Err(anyhow::anyhow!("Credentials missing"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen Address: {}", config.bind_addr());
    println!("  ZwiftPower URL: {}", config.zwiftpower_url);
    println!("  Keyring Service: {}", config.keyring_service);
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Write credentials to the keyring.
fn cmd_set_credentials(config: &Config, username: String, password: String) -> anyhow::Result<()> {
    let store = KeyringStore::new();
    Credentials::new(username, password)
        .store(&store, &config.keyring_service)
        .map_err(ServiceError::from)?;

    // Read back to confirm both values persisted.
    let stored = Credentials::load(&store, &config.keyring_service).map_err(ServiceError::from)?;
    println!(
        "Stored credentials for {} under keyring service '{}'",
        stored.username(),
        config.keyring_service
    );
    Ok(())
}

/// Fetch and print one rider.
async fn cmd_rider(config: &Config, zwift_id: i64) -> anyhow::Result<()> {
    let client = startup_client(config)?;
    let mut riders = client
        .fetch_riders(&[zwift_id])
        .await
        .map_err(ServiceError::from)?;

    let rider = riders
        .remove(&zwift_id)
        .ok_or_else(|| anyhow::anyhow!("Rider {} not found", zwift_id))?;

    println!("{}", serde_json::to_string_pretty(&rider.as_dict())?);
    Ok(())
}

/// Fetch and print one team.
async fn cmd_team(config: &Config, team_id: i64, riders_only: bool) -> anyhow::Result<()> {
    let client = startup_client(config)?;
    let mut teams = client
        .fetch_teams(&[team_id])
        .await
        .map_err(ServiceError::from)?;

    let team = teams
        .remove(&team_id)
        .ok_or_else(|| anyhow::anyhow!("Team {} not found", team_id))?;

    let document = if riders_only { team.as_list() } else { team.as_dict() };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
