//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use direct_response::{default_scheme, Shutdown, WebhookConfig, WebhookServer};
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// Start a plain-HTTP webhook on `addr`.
///
/// Returns the shutdown handle and the sender for config reloads.
pub async fn start_webhook(
    addr: SocketAddr,
    mut config: WebhookConfig,
) -> (Shutdown, mpsc::UnboundedSender<WebhookConfig>) {
    config.listener.bind_address = addr.to_string();
    config.observability.metrics_enabled = false;

    let shutdown = Shutdown::new();
    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let server = WebhookServer::new(config, Arc::new(default_scheme()));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    (shutdown, config_tx)
}

/// A DirectResponseRoute object with the given spec.
pub fn route(name: &str, spec: Value) -> Value {
    json!({
        "apiVersion": "gateway.gloo.solo.io/v1alpha1",
        "kind": "DirectResponseRoute",
        "metadata": { "name": name, "namespace": "gloo-system" },
        "spec": spec,
    })
}

/// Wrap an object in an AdmissionReview request.
pub fn admission_review(uid: &str, operation: &str, object: Value) -> Value {
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": uid,
            "kind": { "group": "gateway.gloo.solo.io", "version": "v1alpha1", "kind": "DirectResponseRoute" },
            "resource": { "group": "gateway.gloo.solo.io", "version": "v1alpha1", "resource": "directresponseroutes" },
            "name": object["metadata"]["name"],
            "namespace": "gloo-system",
            "operation": operation,
            "userInfo": { "username": "system:admin" },
            "object": object,
        }
    })
}

/// HTTP client without connection pooling.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
