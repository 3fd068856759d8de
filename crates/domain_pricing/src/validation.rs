//! Mode-dependent request validation
//!
//! # Validation Rules
//!
//! ## Transfer Services
//! - Distance must be present and greater than zero
//! - Vehicle type id must be present
//! - Segment id must be present
//!
//! ## Any Service
//! - Distance, when present, must be greater than zero and must not exceed
//!   [`MAX_DISTANCE_KM`]
//! - Wait hours, when present, must not be negative
//!
//! Validation runs before any factor lookup; a rejected request never
//! touches the provider again.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::catalog::{PricingService, ServiceMode};
use crate::error::PricingError;
use crate::request::PricingRequest;

/// Upper bound on a quoted distance, guarding against data-entry errors
pub const MAX_DISTANCE_KM: Decimal = dec!(1000);

/// Checks the request supplies what the service's mode requires
///
/// # Errors
///
/// Returns `PricingError::InvalidInput` naming the first offending field
pub fn validate(request: &PricingRequest, service: &PricingService) -> Result<(), PricingError> {
    if service.mode == ServiceMode::Transfer {
        if request.distance_km().is_none() {
            return Err(PricingError::invalid_input("distanceKm", "is required for transfer services"));
        }
        if request.vehicle_type_id().is_none() {
            return Err(PricingError::invalid_input("vehicleTypeId", "is required for transfer services"));
        }
        if request.segment_id().is_none() {
            return Err(PricingError::invalid_input("segmentId", "is required for transfer services"));
        }
    }

    if let Some(distance) = request.distance_km() {
        if distance <= Decimal::ZERO {
            return Err(PricingError::invalid_input("distanceKm", "must be greater than zero"));
        }
        if distance > MAX_DISTANCE_KM {
            return Err(PricingError::invalid_input(
                "distanceKm",
                format!("must not exceed {} km", MAX_DISTANCE_KM),
            ));
        }
    }

    if let Some(hours) = request.wait_hours() {
        if hours < Decimal::ZERO {
            return Err(PricingError::invalid_input("horasEspera", "must not be negative"));
        }
    }

    Ok(())
}
