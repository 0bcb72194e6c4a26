//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Register served kinds
//! - Start the config watcher and signal handler
//! - Bind the listener and begin accepting reviews
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admission::default_scheme;
use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, WebhookConfig};
use crate::http::WebhookServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::net::tls::load_tls_config;
use crate::observability::{logging, metrics};

/// Run the webhook until a termination signal.
///
/// Without a config path the defaults are used and hot reload is off.
pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => WebhookConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "direct-response webhook starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        max_body_bytes = ?config.admission.max_body_bytes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let scheme = Arc::new(default_scheme());
    tracing::info!(kinds = ?scheme.kinds(), "Scheme ready");

    // the watcher handle stops watching when dropped
    let (config_updates, _watcher) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let tls = config.listener.tls.clone();
    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let server = WebhookServer::new(config, scheme);

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, config_updates, shutdown.subscribe()).await?;
        }
        None => {
            tracing::warn!("TLS is not configured; the API server only calls HTTPS webhooks");
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, config_updates, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
