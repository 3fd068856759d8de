//! Mode-specific fare formulas
//!
//! # Transfer
//!
//! ```text
//! base    = base_per_km × distance
//! product = base × vehicle × segment × zone × schedule
//! fare    = max(product, min_fare) + stops × 3000 + wait_hours × 16000
//! ```
//!
//! The minimum fare floor is applied before the surcharges.
//!
//! # Tour
//!
//! ```text
//! base = max(base_flat, min_fare)
//! fare = base × zone × schedule
//! ```
//!
//! All amounts are CLP and unrounded; rounding happens in
//! [`settlement`](crate::settlement).

use std::collections::BTreeMap;

use core_kernel::MoneyError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{PricingFactors, PricingService, PricingSettings, ServiceMode};
use crate::error::PricingError;
use crate::request::PricingRequest;

/// Flat surcharge per intermediate stop, CLP
pub const STOP_SURCHARGE_CLP: Decimal = dec!(3000);

/// Flat surcharge per hour waited, CLP
pub const WAIT_HOUR_SURCHARGE_CLP: Decimal = dec!(16000);

/// Breakdown keys
pub mod keys {
    pub const BASE_PER_KM_CLP: &str = "basePerKmCLP";
    pub const DISTANCE_KM: &str = "distanceKm";
    pub const BASE_CLP: &str = "baseCLP";
    pub const PRODUCT_CLP: &str = "productCLP";
    pub const BASE_FLAT_CLP: &str = "baseFlatCLP";
    pub const MIN_FARE_CLP: &str = "minFareCLP";
    pub const FACTOR_VEHICLE: &str = "factorVehicle";
    pub const FACTOR_SEGMENT: &str = "factorSegment";
    pub const FACTOR_ZONE: &str = "factorZone";
    pub const FACTOR_SCHEDULE: &str = "factorSchedule";
    pub const STOPS_SURCHARGE_CLP: &str = "stopsSurchargeCLP";
    pub const WAIT_SURCHARGE_CLP: &str = "waitSurchargeCLP";
}

/// Named sub-amounts and factors behind a fare, in key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakdown(BTreeMap<String, Decimal>);

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Decimal) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.0.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw fare plus the breakdown that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareComputation {
    /// Unrounded fare in CLP
    pub raw_fare: Decimal,
    pub breakdown: Breakdown,
}

/// Applies the formula for the service's mode
///
/// # Errors
///
/// - `UnsupportedMode` for any mode other than transfer or tour
/// - `InvalidInput` if a transfer request carries no distance
/// - `Internal` on arithmetic overflow
pub fn calculate_fare(
    request: &PricingRequest,
    service: &PricingService,
    factors: &PricingFactors,
    settings: &PricingSettings,
) -> Result<FareComputation, PricingError> {
    match &service.mode {
        ServiceMode::Transfer => calculate_transfer(request, service, factors, settings),
        ServiceMode::Tour => calculate_tour(service, factors),
        ServiceMode::Other(mode) => Err(PricingError::UnsupportedMode(mode.clone())),
    }
}

fn calculate_transfer(
    request: &PricingRequest,
    service: &PricingService,
    factors: &PricingFactors,
    settings: &PricingSettings,
) -> Result<FareComputation, PricingError> {
    let distance = request
        .distance_km()
        .ok_or_else(|| PricingError::invalid_input("distanceKm", "is required for transfer services"))?;

    let base = mul(settings.base_per_km_clp, distance)?;
    let product = [factors.vehicle, factors.segment, factors.zone, factors.schedule]
        .into_iter()
        .try_fold(base, mul)?;

    let floored = product.max(service.min_fare_clp);

    let stops_surcharge = match request.stops() {
        Some(stops) if stops > 0 => mul(Decimal::from(stops), STOP_SURCHARGE_CLP)?,
        _ => Decimal::ZERO,
    };
    let wait_surcharge = match request.wait_hours() {
        Some(hours) if hours > Decimal::ZERO => mul(hours, WAIT_HOUR_SURCHARGE_CLP)?,
        _ => Decimal::ZERO,
    };

    let raw_fare = add(add(floored, stops_surcharge)?, wait_surcharge)?;

    let mut breakdown = Breakdown::new();
    breakdown.insert(keys::BASE_PER_KM_CLP, settings.base_per_km_clp);
    breakdown.insert(keys::DISTANCE_KM, distance);
    breakdown.insert(keys::BASE_CLP, base);
    breakdown.insert(keys::PRODUCT_CLP, product);
    breakdown.insert(keys::FACTOR_VEHICLE, factors.vehicle);
    breakdown.insert(keys::FACTOR_SEGMENT, factors.segment);
    breakdown.insert(keys::FACTOR_ZONE, factors.zone);
    breakdown.insert(keys::FACTOR_SCHEDULE, factors.schedule);
    breakdown.insert(keys::MIN_FARE_CLP, service.min_fare_clp);
    breakdown.insert(keys::STOPS_SURCHARGE_CLP, stops_surcharge);
    breakdown.insert(keys::WAIT_SURCHARGE_CLP, wait_surcharge);

    Ok(FareComputation { raw_fare, breakdown })
}

fn calculate_tour(
    service: &PricingService,
    factors: &PricingFactors,
) -> Result<FareComputation, PricingError> {
    let base = service.base_flat_clp.max(service.min_fare_clp);
    let raw_fare = mul(mul(base, factors.zone)?, factors.schedule)?;

    let mut breakdown = Breakdown::new();
    breakdown.insert(keys::BASE_FLAT_CLP, service.base_flat_clp);
    breakdown.insert(keys::MIN_FARE_CLP, service.min_fare_clp);
    breakdown.insert(keys::BASE_CLP, base);
    breakdown.insert(keys::FACTOR_ZONE, factors.zone);
    breakdown.insert(keys::FACTOR_SCHEDULE, factors.schedule);

    Ok(FareComputation { raw_fare, breakdown })
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or_else(|| MoneyError::Overflow.into())
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal, PricingError> {
    a.checked_add(b).ok_or_else(|| MoneyError::Overflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{CurrencyCode, Rate};

    fn settings() -> PricingSettings {
        PricingSettings {
            base_per_km_clp: dec!(1200),
            commission_rate: Rate::new(dec!(0.20)),
            default_currency: CurrencyCode::clp(),
            rounding_decimals: 2,
        }
    }

    fn transfer_request(distance: Decimal) -> PricingRequest {
        PricingRequest::builder("T004", "urbana", "normal", CurrencyCode::clp())
            .distance_km(distance)
            .vehicle_type_id("van_estandar")
            .segment_id("B2C")
            .build()
            .unwrap()
    }

    #[test]
    fn test_transfer_above_minimum() {
        let service = PricingService::transfer("T003", "Urbano", dec!(12000));
        let factors = PricingFactors {
            vehicle: dec!(1.4),
            ..PricingFactors::default()
        };
        let fare = calculate_fare(&transfer_request(dec!(50)), &service, &factors, &settings()).unwrap();

        assert_eq!(fare.breakdown.get(keys::BASE_CLP), Some(dec!(60000)));
        assert_eq!(fare.raw_fare, dec!(84000));
    }

    #[test]
    fn test_surcharges_added_after_floor() {
        let service = PricingService::transfer("T004", "Aeropuerto", dec!(42000));
        let request = PricingRequest::builder("T004", "urbana", "normal", CurrencyCode::clp())
            .distance_km(dec!(1))
            .vehicle_type_id("van_estandar")
            .segment_id("B2C")
            .stops(1)
            .wait_hours(dec!(0.5))
            .build()
            .unwrap();
        let fare = calculate_fare(&request, &service, &PricingFactors::default(), &settings()).unwrap();

        assert_eq!(fare.raw_fare, dec!(42000) + dec!(3000) + dec!(8000));
        assert_eq!(fare.breakdown.get(keys::STOPS_SURCHARGE_CLP), Some(dec!(3000)));
        assert_eq!(fare.breakdown.get(keys::WAIT_SURCHARGE_CLP), Some(dec!(8000.0)));
    }

    #[test]
    fn test_tour_uses_larger_of_flat_and_minimum() {
        let service = PricingService::tour("T015", "City tour", dec!(250000), dec!(200000));
        let factors = PricingFactors {
            schedule: dec!(1.2),
            ..PricingFactors::default()
        };
        let request = PricingRequest::builder("T015", "urbana", "punta", CurrencyCode::clp())
            .build()
            .unwrap();
        let fare = calculate_fare(&request, &service, &factors, &settings()).unwrap();
        assert_eq!(fare.raw_fare, dec!(300000));
        assert!(!fare.breakdown.contains_key(keys::DISTANCE_KM));
    }

    #[test]
    fn test_other_mode_is_unsupported() {
        let mut service = PricingService::transfer("X001", "Charter", dec!(1000));
        service.mode = ServiceMode::Other("charter".to_string());
        let err = calculate_fare(&transfer_request(dec!(10)), &service, &PricingFactors::default(), &settings())
            .unwrap_err();
        assert_eq!(err, PricingError::UnsupportedMode("charter".to_string()));
    }

    #[test]
    fn test_transfer_without_distance_is_rejected() {
        let service = PricingService::transfer("T004", "Aeropuerto", dec!(42000));
        let request = PricingRequest::builder("T004", "urbana", "normal", CurrencyCode::clp())
            .build()
            .unwrap();
        let err = calculate_fare(&request, &service, &PricingFactors::default(), &settings()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { .. }));
    }
}
