//! Gateway API resources served by this crate.
//!
//! # Data Flow
//! ```text
//! operator manifest / AdmissionReview
//!     → serde (syntactic decode into typed resource)
//!     → admission::validation (semantic checks, once per submission)
//!     → admitted resource
//!     → accessors (code(), body()) read by controller / data plane
//! ```
//!
//! # Design Decisions
//! - One module per API version
//! - Types derive `CustomResource` so the CRD is generated from the Rust type
//! - Status is declared here but never written by this crate

pub mod v1alpha1;

/// API group of every resource in this crate.
pub const GROUP: &str = "gateway.gloo.solo.io";
