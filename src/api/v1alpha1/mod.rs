//! `gateway.gloo.solo.io/v1alpha1` resources.

pub mod crd;
pub mod direct_response;

pub use direct_response::{
    DirectResponseAccess, DirectResponseRoute, DirectResponseRouteSpec, DirectResponseRouteStatus,
};

/// API version of this module.
pub const VERSION: &str = "v1alpha1";
