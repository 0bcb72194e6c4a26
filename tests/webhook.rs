//! End-to-end tests of the admission webhook over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use direct_response::WebhookConfig;
use serde_json::{json, Value};

mod common;

async fn post_review(addr: SocketAddr, review: &Value) -> Value {
    let res = common::client()
        .post(format!("http://{}/validate", addr))
        .json(review)
        .send()
        .await
        .expect("Webhook unreachable");
    assert_eq!(res.status(), 200);
    res.json::<Value>().await.unwrap()["response"].clone()
}

#[tokio::test]
async fn test_admission_verdicts() {
    let addr: SocketAddr = "127.0.0.1:28443".parse().unwrap();
    let (shutdown, _config_tx) = common::start_webhook(addr, WebhookConfig::default()).await;

    let cases = [
        (json!({"code": 200, "body": "ok"}), true, None),
        (json!({"code": 200}), false, Some("CrossFieldViolation")),
        (json!({"code": 404}), true, None),
        (json!({"code": 50}), false, Some("DomainViolation")),
        (json!({}), false, Some("MissingRequiredField")),
    ];

    for (i, (spec, allowed, kind)) in cases.into_iter().enumerate() {
        let uid = format!("uid-{i}");
        let review = common::admission_review(&uid, "CREATE", common::route("r", spec.clone()));
        let response = post_review(addr, &review).await;

        assert_eq!(response["uid"], uid.as_str());
        assert_eq!(response["allowed"], allowed, "spec {spec}");
        if let Some(kind) = kind {
            let message = response["status"]["message"].as_str().unwrap();
            assert!(message.contains(kind), "message {message:?} should name {kind}");
        }
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_body_limit_reload() {
    let addr: SocketAddr = "127.0.0.1:28444".parse().unwrap();
    let (shutdown, config_tx) = common::start_webhook(addr, WebhookConfig::default()).await;

    let review = common::admission_review(
        "uid-limit",
        "UPDATE",
        common::route("banner", json!({"code": 200, "body": "a rather long maintenance banner"})),
    );
    assert_eq!(post_review(addr, &review).await["allowed"], true);

    let mut reloaded = WebhookConfig::default();
    reloaded.admission.max_body_bytes = Some(8);
    config_tx.send(reloaded).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = post_review(addr, &review).await;
    assert_eq!(response["allowed"], false);
    assert!(response["status"]["message"].as_str().unwrap().contains("spec.body"));

    let status: Value = common::client()
        .get(format!("http://{}/status", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["max_body_bytes"], 8);

    shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let addr: SocketAddr = "127.0.0.1:28445".parse().unwrap();
    let (shutdown, _config_tx) = common::start_webhook(addr, WebhookConfig::default()).await;

    let res = common::client()
        .get(format!("http://{}/healthz", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    drop(res);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let res = common::client()
        .get(format!("http://{}/healthz", addr))
        .timeout(Duration::from_secs(1))
        .send()
        .await;
    assert!(res.is_err(), "server should refuse connections after shutdown");
}
