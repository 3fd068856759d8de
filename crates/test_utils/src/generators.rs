//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating quote inputs that respect the
//! request invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::{TourRequestBuilder, TransferRequestBuilder};
use crate::fixtures::FactorFixtures;
use domain_pricing::PricingRequest;

/// Distances in (0, 1000] km with up to two decimals
pub fn distance_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Non-negative wait hours with one decimal
pub fn wait_hours_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=240i64).prop_map(|tenths| Decimal::new(tenths, 1))
}

/// Raw fares in CLP with up to four decimals
pub fn raw_fare_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000_000_000i64).prop_map(|ten_thousandths| Decimal::new(ten_thousandths, 4))
}

/// Commission rates in [0, 1) with up to four decimals
pub fn commission_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000i64).prop_map(|ten_thousandths| Decimal::new(ten_thousandths, 4))
}

fn pick(table: Vec<(&'static str, Decimal)>) -> impl Strategy<Value = &'static str> {
    let ids: Vec<&'static str> = table.into_iter().map(|(id, _)| id).collect();
    proptest::sample::select(ids)
}

pub fn vehicle_strategy() -> impl Strategy<Value = &'static str> {
    pick(FactorFixtures::vehicles())
}

pub fn segment_strategy() -> impl Strategy<Value = &'static str> {
    pick(FactorFixtures::segments())
}

pub fn zone_strategy() -> impl Strategy<Value = &'static str> {
    pick(FactorFixtures::zones())
}

pub fn schedule_strategy() -> impl Strategy<Value = &'static str> {
    pick(FactorFixtures::schedules())
}

pub fn currency_strategy() -> impl Strategy<Value = &'static str> {
    pick(FactorFixtures::currency_rates())
}

/// Valid transfer requests over the reference catalogue
pub fn transfer_request_strategy() -> impl Strategy<Value = PricingRequest> {
    (
        prop_oneof![Just("T003"), Just("T004"), Just("T009")],
        distance_strategy(),
        vehicle_strategy(),
        segment_strategy(),
        zone_strategy(),
        schedule_strategy(),
        currency_strategy(),
        0u32..6,
        wait_hours_strategy(),
    )
        .prop_map(
            |(service, km, vehicle, segment, zone, schedule, currency, stops, wait)| {
                TransferRequestBuilder::new()
                    .service(service)
                    .distance_km(km)
                    .vehicle(vehicle)
                    .segment(segment)
                    .zone(zone)
                    .schedule(schedule)
                    .currency(currency)
                    .stops(stops)
                    .wait_hours(wait)
                    .build()
            },
        )
}

/// Valid tour requests over the reference catalogue
pub fn tour_request_strategy() -> impl Strategy<Value = PricingRequest> {
    (
        prop_oneof![Just("T014"), Just("T015")],
        zone_strategy(),
        schedule_strategy(),
        currency_strategy(),
    )
        .prop_map(|(service, zone, schedule, currency)| {
            TourRequestBuilder::new()
                .service(service)
                .zone(zone)
                .schedule(schedule)
                .currency(currency)
                .build()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn distances_stay_in_range(km in distance_strategy()) {
            prop_assert!(km > Decimal::ZERO);
            prop_assert!(km <= Decimal::new(1000, 0));
        }

        #[test]
        fn transfer_requests_carry_vehicle(request in transfer_request_strategy()) {
            prop_assert!(request.vehicle_type_id().is_some());
            prop_assert!(request.distance_km().is_some());
        }
    }
}
