//! DirectResponseRoute API types, admission gate and webhook.
//!
//! A DirectResponseRoute tells the gateway to answer a matched route with a
//! fixed status code and body instead of forwarding upstream. This crate
//! defines the resource, validates it at admission, and exposes the resolved
//! code and body to the controller and data plane.

pub mod admission;
pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod manifest;
pub mod net;
pub mod observability;

pub use admission::{default_scheme, Scheme, ValidationError, ValidationOptions, ViolationKind};
pub use api::v1alpha1::{DirectResponseAccess, DirectResponseRoute, DirectResponseRouteSpec, DirectResponseRouteStatus};
pub use config::WebhookConfig;
pub use http::WebhookServer;
pub use lifecycle::shutdown::Shutdown;
