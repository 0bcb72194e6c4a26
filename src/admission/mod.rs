//! Admission subsystem.
//!
//! # Data Flow
//! ```text
//! AdmissionReview (webhook) / manifest document (CLI)
//!     → scheme.rs (look up kind, decode typed object)
//!     → validation.rs (semantic checks)
//!     → review.rs (verdict: allowed, or denied with message)
//! ```
//!
//! # Design Decisions
//! - Validation is a gate evaluated once per submission
//! - Admitted objects are trusted downstream; nobody re-validates
//! - Rejections carry the violation class and the rule that failed

pub mod review;
pub mod scheme;
pub mod validation;

pub use scheme::{default_scheme, Admissible, AdmissionError, Scheme};
pub use validation::{validate, validate_all, validate_with, ValidationError, ValidationOptions, ViolationKind};
