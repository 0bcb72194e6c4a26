//! Request handlers.

use axum::{body::Bytes, extract::State, Json};
use kube::core::admission::AdmissionReview;
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};

use crate::admission::review;
use crate::http::server::AppState;

/// Service status reported by `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub kinds: Vec<String>,
    pub max_body_bytes: Option<usize>,
}

/// `POST /validate`: answer an AdmissionReview.
///
/// A body that is not a valid review is still answered with a review.
pub async fn validate(State(state): State<AppState>, body: Bytes) -> Json<AdmissionReview<DynamicObject>> {
    let options = state.options.load();
    Json(review::review_payload(&state.scheme, &options, &body))
}

/// `GET /healthz`: liveness.
pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /status`: version, served kinds and live admission options.
pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let options = state.options.load();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        kinds: state.scheme.kinds(),
        max_body_bytes: options.max_body_bytes,
    })
}
