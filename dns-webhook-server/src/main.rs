//! ExternalDNS webhook for EdgeCenter DNS
//!
//! Serves the webhook protocol on `WEBHOOK_LISTEN_ADDR` and reconciles the
//! orchestrator's change sets against the EdgeCenter API. See [`config`] for
//! the environment variables.

mod config;
mod error;
mod logging;
mod media;
mod routes;
mod state;

use std::process::ExitCode;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use dns_webhook_provider::{create_client, mask_secret};
use tracing::{error, info, warn};

use config::Config;
use state::AppState;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

const BANNER: &str = r"
     _                                _     _                 _
  __| |_ __  ___    __      _____| |__ | |__   ___   ___ | | __
 / _` | '_ \/ __|___\ \ /\ / / _ \ '_ \| '_ \ / _ \ / _ \| |/ /
| (_| | | | \__ \____\ V  V /  __/ |_) | | | | (_) | (_) |   <
 \__,_|_| |_|___/     \_/\_/ \___|_.__/|_| |_|\___/ \___/|_|\_\
";

#[actix_web::main]
async fn main() -> ExitCode {
    println!("{BANNER}\nexternal-dns edgecenter webhook\nVersion {}\n", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init(&config.log) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "webhook server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let client_config = config.client_config();
    info!(
        api_url = client_config.api_url.as_deref().unwrap_or("default"),
        api_token = %mask_secret(&client_config.api_token),
        max_retries = client_config.max_retries,
        "initializing provider client"
    );
    let client = create_client(client_config).context("failed to init provider")?;

    if config.dry_run {
        warn!(dry_run = true, "dry-run mode: changes are logged, never sent");
    }

    let addr = config.listen_addr()?;
    let state = web::Data::new(AppState::from_config(client, &config));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .disable_signals()
    .shutdown_timeout(SHUTDOWN_TIMEOUT.as_secs())
    .bind(addr)
    .with_context(|| format!("can't serve on addr {addr}"))?
    .run();

    info!("starting listening on {addr}");
    let handle = server.handle();

    tokio::select! {
        result = server => {
            result.context("server stopped unexpectedly")?;
        }
        signal = shutdown_signal() => {
            info!("shutting down server due to received signal: {}", signal?);
            handle.stop(true).await;
        }
    }

    info!("server stopped");
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM (Ctrl-C elsewhere).
async fn shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).context("failed to listen for SIGTERM")?;
        let mut int = signal(SignalKind::interrupt()).context("failed to listen for SIGINT")?;
        tokio::select! {
            _ = term.recv() => Ok("SIGTERM"),
            _ = int.recv() => Ok("SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?;
        Ok("Ctrl-C")
    }
}
