//! AdmissionReview handling.
//!
//! # Responsibilities
//! - Decode an `admission.k8s.io/v1` review into a request
//! - Decide: admit or deny, with an actionable message
//! - Record the decision (logs, metrics)
//!
//! # Design Decisions
//! - Only CREATE and UPDATE of the main resource are validated
//! - `status` subresource writes belong to the controller and pass untouched
//! - The webhook never patches: responses carry a verdict only

use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use serde_json::Value;

use crate::admission::scheme::Scheme;
use crate::admission::validation::ValidationOptions;
use crate::observability::metrics;

/// Answer a raw review payload.
///
/// A payload that does not decode as an `AdmissionReview` still gets a review
/// back, with an invalid response.
pub fn review_payload(
    scheme: &Scheme,
    options: &ValidationOptions,
    payload: &[u8],
) -> AdmissionReview<DynamicObject> {
    match serde_json::from_slice::<AdmissionReview<DynamicObject>>(payload) {
        Ok(admission_review) => review(scheme, options, admission_review),
        Err(err) => {
            tracing::warn!(error = %err, "Undecodable admission review");
            AdmissionResponse::invalid(err.to_string()).into_review()
        }
    }
}

/// Answer a review.
pub fn review(
    scheme: &Scheme,
    options: &ValidationOptions,
    review: AdmissionReview<DynamicObject>,
) -> AdmissionReview<DynamicObject> {
    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "Malformed admission review");
            return AdmissionResponse::invalid(err.to_string()).into_review();
        }
    };

    decide(scheme, options, &request).into_review()
}

/// Decide a single admission request.
pub fn decide(
    scheme: &Scheme,
    options: &ValidationOptions,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    let start_time = std::time::Instant::now();
    let operation = operation_label(&request.operation);
    let response = AdmissionResponse::from(request);

    if !matches!(request.operation, Operation::Create | Operation::Update)
        || request.sub_resource.as_deref() == Some("status")
    {
        tracing::debug!(uid = %request.uid, operation, "Admission request skipped");
        metrics::record_review(operation, true, start_time);
        return response;
    }

    let verdict = match &request.object {
        Some(object) => admit_object(scheme, options, request, object),
        None => Err("request carries no object".to_string()),
    };

    let allowed = verdict.is_ok();
    tracing::info!(
        uid = %request.uid,
        kind = %request.kind.kind,
        namespace = request.namespace.as_deref().unwrap_or(""),
        name = %request.name,
        operation,
        dry_run = request.dry_run,
        allowed,
        "Admission decision"
    );
    metrics::record_review(operation, allowed, start_time);

    match verdict {
        Ok(()) => response,
        Err(message) => response.deny(message),
    }
}

fn admit_object(
    scheme: &Scheme,
    options: &ValidationOptions,
    request: &AdmissionRequest<DynamicObject>,
    object: &DynamicObject,
) -> Result<(), String> {
    let mut value = serde_json::to_value(object).map_err(|err| err.to_string())?;

    // the object inherits its type from the request when it carries none
    if let Some(map) = value.as_object_mut() {
        let gvk = &request.kind;
        let api_version = if gvk.group.is_empty() {
            gvk.version.clone()
        } else {
            format!("{}/{}", gvk.group, gvk.version)
        };
        map.entry("apiVersion").or_insert(Value::String(api_version));
        map.entry("kind").or_insert_with(|| Value::String(gvk.kind.clone()));
    }

    scheme.admit(value, options).map(|_| ()).map_err(|err| {
        for violation in err.violations() {
            metrics::record_violation(violation.kind().as_str());
        }
        err.to_string()
    })
}

fn operation_label(operation: &Operation) -> &'static str {
    match operation {
        Operation::Create => "CREATE",
        Operation::Update => "UPDATE",
        Operation::Delete => "DELETE",
        Operation::Connect => "CONNECT",
    }
}
