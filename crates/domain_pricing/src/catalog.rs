//! Pricing reference data
//!
//! Services, global settings and the per-request factor set. All of it is
//! owned by a [`PricingProviderPort`](crate::ports::PricingProviderPort)
//! implementation; the engine only reads it.

use std::fmt;

use core_kernel::{CurrencyCode, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// How a service is priced
///
/// Modes are provider data. Anything other than `transfer` or `tour` is kept
/// as [`ServiceMode::Other`] so the engine can reject it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceMode {
    /// Point-to-point ride priced by distance
    Transfer,
    /// Flat-rate itinerary priced independent of distance
    Tour,
    /// A mode the engine does not know how to price
    Other(String),
}

impl ServiceMode {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceMode::Transfer => "transfer",
            ServiceMode::Tour => "tour",
            ServiceMode::Other(mode) => mode,
        }
    }

    /// Returns true for modes the fare calculator can price
    pub fn is_supported(&self) -> bool {
        !matches!(self, ServiceMode::Other(_))
    }
}

impl From<&str> for ServiceMode {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "transfer" => ServiceMode::Transfer,
            "tour" => ServiceMode::Tour,
            _ => ServiceMode::Other(value.to_string()),
        }
    }
}

impl From<String> for ServiceMode {
    fn from(value: String) -> Self {
        ServiceMode::from(value.as_str())
    }
}

impl From<ServiceMode> for String {
    fn from(mode: ServiceMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a service can currently be sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Active,
    Inactive,
}

/// A sellable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingService {
    /// Service code (e.g. `T004`)
    pub code: String,
    /// Display name
    pub name: String,
    /// Pricing mode
    pub mode: ServiceMode,
    /// Minimum fare in CLP
    #[serde(rename = "minFareCLP")]
    pub min_fare_clp: Decimal,
    /// Flat base fare in CLP, zero for non-tour services
    #[serde(rename = "baseFlatCLP")]
    pub base_flat_clp: Decimal,
    /// Active/inactive status
    pub status: ServiceStatus,
}

impl PricingService {
    /// Creates an active transfer service
    pub fn transfer(code: impl Into<String>, name: impl Into<String>, min_fare_clp: Decimal) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            mode: ServiceMode::Transfer,
            min_fare_clp,
            base_flat_clp: Decimal::ZERO,
            status: ServiceStatus::Active,
        }
    }

    /// Creates an active tour service
    pub fn tour(
        code: impl Into<String>,
        name: impl Into<String>,
        base_flat_clp: Decimal,
        min_fare_clp: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            mode: ServiceMode::Tour,
            min_fare_clp,
            base_flat_clp,
            status: ServiceStatus::Active,
        }
    }

    /// Replaces the status
    pub fn with_status(mut self, status: ServiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ServiceStatus::Active
    }
}

/// Global pricing constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSettings {
    /// Base rate per kilometer in CLP
    #[serde(rename = "basePerKmCLP")]
    pub base_per_km_clp: Decimal,
    /// Platform commission, a fraction in `[0, 1)`
    pub commission_rate: Rate,
    /// Currency used when the caller does not name one
    pub default_currency: CurrencyCode,
    /// Decimal places used for rounding fares, commissions and payouts
    pub rounding_decimals: u32,
}

impl PricingSettings {
    /// Largest supported rounding precision
    pub const MAX_ROUNDING_DECIMALS: u32 = 8;

    /// Checks the settings are usable for a quote
    ///
    /// Settings are provider data, so a bad value is an internal failure
    /// rather than something the caller can fix.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.base_per_km_clp <= Decimal::ZERO {
            return Err(PricingError::internal(
                "settings",
                format!("base per km must be positive, got {}", self.base_per_km_clp),
            ));
        }
        Rate::fraction(self.commission_rate.as_decimal())
            .map_err(|e| PricingError::internal("settings", e))?;
        if self.rounding_decimals > Self::MAX_ROUNDING_DECIMALS {
            return Err(PricingError::internal(
                "settings",
                format!("rounding decimals {} exceeds {}", self.rounding_decimals, Self::MAX_ROUNDING_DECIMALS),
            ));
        }
        Ok(())
    }
}

/// The four multipliers resolved for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingFactors {
    pub vehicle: Decimal,
    pub segment: Decimal,
    pub zone: Decimal,
    pub schedule: Decimal,
}

impl Default for PricingFactors {
    fn default() -> Self {
        Self {
            vehicle: Decimal::ONE,
            segment: Decimal::ONE,
            zone: Decimal::ONE,
            schedule: Decimal::ONE,
        }
    }
}

impl PricingFactors {
    /// Multiplies every factor together
    pub fn product(&self) -> Decimal {
        self.vehicle * self.segment * self.zone * self.schedule
    }
}
