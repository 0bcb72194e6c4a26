//! DirectResponseRoute spec validation.
//!
//! # Responsibilities
//! - Semantic validation of a decoded spec (serde handles syntactic)
//! - Check the required code is present and within [100, 599]
//! - Enforce that 2xx codes carry a body
//! - Apply the optional body length limit
//!
//! # Design Decisions
//! - Pure function of the spec and options; no hidden state
//! - Checks run in a fixed order; `validate` stops at the first violation,
//!   `validate_all` reports every one in the same order
//! - Nothing is coerced: no default code, no default body

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::v1alpha1::DirectResponseRouteSpec;

/// Status codes a route may return.
pub const CODE_RANGE: RangeInclusive<i32> = 100..=599;

/// Codes that require a body.
pub const SUCCESS_RANGE: RangeInclusive<i32> = 200..=299;

/// Message of the 2xx body rule, shared with the CRD validation rule.
pub const BODY_REQUIRED_MESSAGE: &str = "The 'body' field is required when 'code' is a 2xx status code";

/// Machine-readable class of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A required field was not given.
    MissingRequiredField,
    /// A field value lies outside its allowed domain.
    DomainViolation,
    /// A rule spanning several fields does not hold.
    CrossFieldViolation,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequiredField => "MissingRequiredField",
            ViolationKind::DomainViolation => "DomainViolation",
            ViolationKind::CrossFieldViolation => "CrossFieldViolation",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reason a spec is rejected at admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `spec.code` was not given.
    #[error("spec.code: Required value")]
    MissingCode,

    /// `spec.code` is not a valid HTTP status code.
    #[error("spec.code: Invalid value: {code}: must be between 100 and 599, inclusive")]
    CodeOutOfRange { code: i64 },

    /// A 2xx code was given without a body.
    #[error("spec: Invalid value: code {code}: {}", BODY_REQUIRED_MESSAGE)]
    BodyRequired { code: i32 },

    /// `spec.body` exceeds the configured limit.
    #[error("spec.body: Too long: {len} bytes, may not be more than {max} bytes")]
    BodyTooLong { len: usize, max: usize },
}

impl ValidationError {
    /// Class of this violation.
    pub fn kind(&self) -> ViolationKind {
        match self {
            ValidationError::MissingCode => ViolationKind::MissingRequiredField,
            ValidationError::CodeOutOfRange { .. } | ValidationError::BodyTooLong { .. } => {
                ViolationKind::DomainViolation
            }
            ValidationError::BodyRequired { .. } => ViolationKind::CrossFieldViolation,
        }
    }

    /// Path of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingCode | ValidationError::CodeOutOfRange { .. } => "spec.code",
            ValidationError::BodyRequired { .. } => "spec",
            ValidationError::BodyTooLong { .. } => "spec.body",
        }
    }
}

/// Tunables for admission checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Maximum body length in bytes. `None` leaves bodies unbounded.
    pub max_body_bytes: Option<usize>,
}

/// Validate with default options, returning the first violation.
pub fn validate(spec: &DirectResponseRouteSpec) -> Result<(), ValidationError> {
    validate_with(spec, &ValidationOptions::default())
}

/// Validate with the given options, returning the first violation.
pub fn validate_with(spec: &DirectResponseRouteSpec, options: &ValidationOptions) -> Result<(), ValidationError> {
    match violations(spec, options).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Validate with the given options, returning every violation.
pub fn validate_all(spec: &DirectResponseRouteSpec, options: &ValidationOptions) -> Result<(), Vec<ValidationError>> {
    let errors = violations(spec, options);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn violations(spec: &DirectResponseRouteSpec, options: &ValidationOptions) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match spec.code {
        None => errors.push(ValidationError::MissingCode),
        Some(code) if !CODE_RANGE.contains(&code) => errors.push(ValidationError::CodeOutOfRange { code: code.into() }),
        Some(code) if SUCCESS_RANGE.contains(&code) && spec.body.is_none() => {
            errors.push(ValidationError::BodyRequired { code })
        }
        Some(_) => {}
    }

    if let (Some(body), Some(max)) = (&spec.body, options.max_body_bytes) {
        if body.len() > max {
            errors.push(ValidationError::BodyTooLong { len: body.len(), max });
        }
    }

    errors
}
