//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve plain HTTP or HTTPS on the configured listener
//! - Apply reloaded admission options without restarting
//! - Stop gracefully on the shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admission::{Scheme, ValidationOptions};
use crate::config::WebhookConfig;
use crate::http::handlers;
use crate::http::request::{make_span, propagate_request_id_layer, set_request_id_layer};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registered kinds, fixed at startup.
    pub scheme: Arc<Scheme>,
    /// Live admission options, swapped on reload.
    pub options: Arc<ArcSwap<ValidationOptions>>,
}

impl AppState {
    pub fn new(scheme: Arc<Scheme>, options: ValidationOptions) -> Self {
        Self {
            scheme,
            options: Arc::new(ArcSwap::from_pointee(options)),
        }
    }
}

/// HTTP server for the admission webhook.
pub struct WebhookServer {
    router: Router,
    config: WebhookConfig,
    state: AppState,
}

impl WebhookServer {
    /// Create a new server with the given configuration and scheme.
    pub fn new(config: WebhookConfig, scheme: Arc<Scheme>) -> Self {
        let state = AppState::new(scheme, ValidationOptions::from(&config.admission));
        let router = Self::build_router(&config, state.clone());
        Self { router, config, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &WebhookConfig, state: AppState) -> Router {
        Router::new()
            .route("/validate", post(handlers::validate))
            .route("/healthz", get(handlers::healthz))
            .route("/status", get(handlers::get_status))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Serve plain HTTP on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<WebhookConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tls = false, "Webhook server starting");

        tokio::spawn(apply_config_updates(
            self.state.options.clone(),
            self.config.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Webhook server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until shutdown.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<WebhookConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, tls = true, "Webhook server starting");

        tokio::spawn(apply_config_updates(
            self.state.options.clone(),
            self.config.clone(),
            config_updates,
        ));

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("Webhook server stopped");
        Ok(())
    }
}

/// Swap in the admission options of every reloaded config.
async fn apply_config_updates(
    options: Arc<ArcSwap<ValidationOptions>>,
    mut current: WebhookConfig,
    mut updates: mpsc::UnboundedReceiver<WebhookConfig>,
) {
    while let Some(new_config) = updates.recv().await {
        if needs_restart(&current, &new_config) {
            tracing::warn!("Listener or timeout settings changed; restart to apply them");
        }

        let new_options = ValidationOptions::from(&new_config.admission);
        tracing::info!(max_body_bytes = ?new_options.max_body_bytes, "Admission options reloaded");
        options.store(Arc::new(new_options));
        current = new_config;
    }
}

/// Whether moving from `current` to `new` changes settings only a restart applies.
fn needs_restart(current: &WebhookConfig, new: &WebhookConfig) -> bool {
    new.listener != current.listener || new.timeouts != current.timeouts
}
