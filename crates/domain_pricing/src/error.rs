//! Pricing domain errors
//!
//! Every failure of a quote is reported as a single [`PricingError`]. The
//! variant decides how the HTTP layer answers: client errors map to `400`,
//! everything else to `500`.

use std::fmt;

use core_kernel::{MoneyError, PortError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The factor dimension a lookup failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorDimension {
    Vehicle,
    Segment,
    Zone,
    Schedule,
}

impl FactorDimension {
    /// Returns the dimension name used in logs and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorDimension::Vehicle => "vehicle",
            FactorDimension::Segment => "segment",
            FactorDimension::Zone => "zone",
            FactorDimension::Schedule => "schedule",
        }
    }
}

impl fmt::Display for FactorDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while producing a quote
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Unknown or inactive service code
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// A factor id has no configured multiplier, or the multiplier is not positive
    #[error("Invalid {dimension} factor: {id}")]
    InvalidFactors {
        dimension: FactorDimension,
        id: String,
    },

    /// The requested currency has no configured exchange rate
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    /// A mode-required field is missing or a numeric field is out of bounds
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The service's mode is neither transfer nor tour
    #[error("Unsupported service mode: {0}")]
    UnsupportedMode(String),

    /// The caller cancelled the quote before it completed
    #[error("Quote cancelled")]
    Cancelled,

    /// Any other failure (I/O, timeout, corrupt reference data)
    #[error("Internal error during {context}: {message}")]
    Internal { context: String, message: String },
}

impl PricingError {
    /// Creates an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidFactors error
    pub fn invalid_factor(dimension: FactorDimension, id: impl Into<String>) -> Self {
        PricingError::InvalidFactors {
            dimension,
            id: id.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(context: impl Into<String>, message: impl fmt::Display) -> Self {
        PricingError::Internal {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Maps a failed factor lookup
    ///
    /// `NotFound` becomes `InvalidFactors`; any other port failure is internal.
    pub fn from_factor_lookup(dimension: FactorDimension, id: &str, err: PortError) -> Self {
        if err.is_not_found() {
            Self::invalid_factor(dimension, id)
        } else {
            Self::internal(format!("{} factor lookup", dimension), err)
        }
    }

    /// Maps a failed service lookup
    pub fn from_service_lookup(code: &str, err: PortError) -> Self {
        if err.is_not_found() {
            PricingError::ServiceNotFound(code.to_string())
        } else {
            Self::internal("service lookup", err)
        }
    }

    /// Maps a failed exchange rate lookup
    pub fn from_rate_lookup(code: &str, err: PortError) -> Self {
        if err.is_not_found() {
            PricingError::InvalidCurrency(code.to_string())
        } else {
            Self::internal("currency rate lookup", err)
        }
    }

    /// Returns true if the caller supplied something the engine cannot price
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PricingError::ServiceNotFound(_)
                | PricingError::InvalidFactors { .. }
                | PricingError::InvalidCurrency(_)
                | PricingError::InvalidInput { .. }
        )
    }

    /// Returns a stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            PricingError::InvalidFactors { .. } => "INVALID_FACTORS",
            PricingError::InvalidCurrency(_) => "INVALID_CURRENCY",
            PricingError::InvalidInput { .. } => "INVALID_INPUT",
            PricingError::UnsupportedMode(_) => "UNSUPPORTED_MODE",
            PricingError::Cancelled => "CANCELLED",
            PricingError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<MoneyError> for PricingError {
    fn from(err: MoneyError) -> Self {
        PricingError::internal("money arithmetic", err)
    }
}
