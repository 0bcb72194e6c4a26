//! DirectResponseRoute resource definition.
//!
//! # Responsibilities
//! - Declare the desired state (`spec`) and observed state (`status`)
//! - Expose absence-tolerant accessors for the resolved code and body
//!
//! # Design Decisions
//! - Optional fields are `Option<T>`: a code of `0` is never "not given"
//! - Accessors work on `Option<&DirectResponseRoute>` so hot-path callers
//!   never branch on existence before a field read
//! - `status` is owned by the reconciling controller; nothing here writes it

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::admission::validation::{self, ValidationError};

/// DirectResponseRouteSpec describes the desired state of a DirectResponseRoute.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "gateway.gloo.solo.io",
    version = "v1alpha1",
    kind = "DirectResponseRoute",
    doc = "Configuration for defining direct response routes.",
    status = "DirectResponseRouteStatus",
    shortname = "drr",
    category = "gloo-gateway",
    printcolumn = r#"{"name":"Code","type":"integer","jsonPath":".spec.code"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#,
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct DirectResponseRouteSpec {
    /// HTTP status code to return for this route (100-599).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,

    /// Content returned in the HTTP response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl DirectResponseRouteSpec {
    /// Spec with a code and no body.
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            body: None,
        }
    }

    /// Set the response body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Run the admission checks with default options, returning the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}

/// Observed state of a DirectResponseRoute, written by the controller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectResponseRouteStatus {
    /// When the controller last reconciled the route. Advisory only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Time>,
}

/// Read-only view of the response a route resolves to.
///
/// Implemented for `Option<&DirectResponseRoute>` so a missing route reads as
/// "no value" instead of failing.
pub trait DirectResponseAccess {
    /// HTTP status code to return, if any.
    fn code(&self) -> Option<i32>;

    /// Response body to return, if any.
    fn body(&self) -> Option<&str>;
}

impl DirectResponseAccess for DirectResponseRoute {
    fn code(&self) -> Option<i32> {
        self.spec.code
    }

    fn body(&self) -> Option<&str> {
        self.spec.body.as_deref()
    }
}

impl DirectResponseAccess for Option<&DirectResponseRoute> {
    fn code(&self) -> Option<i32> {
        self.and_then(|route| route.spec.code)
    }

    fn body(&self) -> Option<&str> {
        self.and_then(|route| route.spec.body.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn test_accessors_on_present_route() {
        let route = DirectResponseRoute::new("teapot", DirectResponseRouteSpec::with_code(418).body("short and stout"));
        assert_eq!(route.code(), Some(418));
        assert_eq!(route.body(), Some("short and stout"));

        let present = Some(&route);
        assert_eq!(present.code(), Some(418));
        assert_eq!(present.body(), Some("short and stout"));
    }

    #[test]
    fn test_accessors_on_absent_route() {
        let absent: Option<&DirectResponseRoute> = None;
        assert_eq!(absent.code(), None);
        assert_eq!(absent.body(), None);
    }

    #[test]
    fn test_absent_body_is_not_empty_body() {
        let route = DirectResponseRoute::new("gone", DirectResponseRouteSpec::with_code(410));
        assert_eq!(route.body(), None);

        let empty = DirectResponseRoute::new("empty", DirectResponseRouteSpec::with_code(204).body(""));
        assert_eq!(empty.body(), Some(""));
    }

    #[test]
    fn test_resource_identity() {
        assert_eq!(DirectResponseRoute::group(&()), "gateway.gloo.solo.io");
        assert_eq!(DirectResponseRoute::version(&()), "v1alpha1");
        assert_eq!(DirectResponseRoute::kind(&()), "DirectResponseRoute");
        assert_eq!(DirectResponseRoute::plural(&()), "directresponseroutes");
    }

    #[test]
    fn test_spec_wire_format() {
        let spec: DirectResponseRouteSpec = serde_json::from_str(r#"{"code": 200, "body": "ok"}"#).unwrap();
        assert_eq!(spec, DirectResponseRouteSpec::with_code(200).body("ok"));

        let spec: DirectResponseRouteSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec.code, None);

        let spec: DirectResponseRouteSpec = serde_json::from_str(r#"{"code": 0}"#).unwrap();
        assert_eq!(spec.code, Some(0));

        let json = serde_json::to_value(DirectResponseRouteSpec::with_code(404)).unwrap();
        assert_eq!(json, serde_json::json!({"code": 404}));
    }

    #[test]
    fn test_status_uses_camel_case() {
        let status: DirectResponseRouteStatus =
            serde_json::from_str(r#"{"lastUpdated": "2024-05-01T10:00:00Z"}"#).unwrap();
        assert!(status.last_updated.is_some());
    }
}
