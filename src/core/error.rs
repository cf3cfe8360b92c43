//! Error taxonomy shared by the calculation engine and the BOM store

use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors produced by calculations and BOM persistence
#[derive(Debug, Error, Diagnostic)]
pub enum CalcError {
    /// Malformed input, rejected before any computation
    #[error("invalid argument `{field}`: {message}")]
    #[diagnostic(code(cabkit::invalid_argument))]
    InvalidArgument { field: String, message: String },

    /// Valid inputs that combine into a non-positive derived dimension
    #[error("infeasible geometry: {quantity} would be {value:.4}\"")]
    #[diagnostic(
        code(cabkit::infeasible_geometry),
        help("increase the exterior or opening dimensions")
    )]
    InfeasibleGeometry { quantity: String, value: f64 },

    #[error("{kind} not found: {id}")]
    #[diagnostic(code(cabkit::not_found))]
    NotFound { kind: &'static str, id: String },

    #[error("conflict: {0}")]
    #[diagnostic(
        code(cabkit::conflict),
        help("pass --overwrite to regenerate the bill of materials")
    )]
    Conflict(String),

    #[error("storage error: {0}")]
    #[diagnostic(code(cabkit::storage))]
    Storage(String),
}

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    InfeasibleGeometry,
    NotFound,
    Conflict,
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InfeasibleGeometry => "infeasible_geometry",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Storage => "storage",
        };
        write!(f, "{}", s)
    }
}

/// Structured form of a [`CalcError`] for JSON/YAML output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl CalcError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CalcError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infeasible(quantity: impl Into<String>, value: f64) -> Self {
        CalcError::InfeasibleGeometry {
            quantity: quantity.into(),
            value,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            CalcError::InfeasibleGeometry { .. } => ErrorKind::InfeasibleGeometry,
            CalcError::NotFound { .. } => ErrorKind::NotFound,
            CalcError::Conflict(_) => ErrorKind::Conflict,
            CalcError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The offending input field or derived quantity, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidArgument { field, .. } => Some(field),
            CalcError::InfeasibleGeometry { quantity, .. } => Some(quantity),
            _ => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            field: self.field().map(str::to_string),
        }
    }
}

impl From<rusqlite::Error> for CalcError {
    fn from(e: rusqlite::Error) -> Self {
        CalcError::Storage(e.to_string())
    }
}

/// Check that a dimension is finite and strictly positive
pub fn require_positive(field: &str, value: f64) -> Result<f64, CalcError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid(
            field,
            format!("must be greater than zero (got {})", value),
        ));
    }
    Ok(value)
}

/// Check that a derived dimension stays positive
pub fn require_feasible(quantity: &str, value: f64) -> Result<f64, CalcError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::infeasible(quantity, value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_report_carries_field() {
        let err = CalcError::invalid("exterior.width", "must be greater than zero");
        let report = err.report();
        assert_eq!(report.kind, ErrorKind::InvalidArgument);
        assert_eq!(report.field.as_deref(), Some("exterior.width"));
        assert!(report.message.contains("exterior.width"));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("w", 1.0).is_ok());
        assert!(require_positive("w", 0.0).is_err());
        assert!(require_positive("w", -3.0).is_err());
        assert!(require_positive("w", f64::NAN).is_err());
    }

    #[test]
    fn test_require_feasible_reports_quantity() {
        let err = require_feasible("drawer.outer_width", -0.25).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InfeasibleGeometry);
        assert_eq!(err.field(), Some("drawer.outer_width"));
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
