//! Rounding, commission split and currency conversion tests

use core_kernel::{CurrencyCode, ExchangeRate, Money, Rate};
use domain_pricing::settle;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn twenty_percent() -> Rate {
    Rate::new(dec!(0.20))
}

#[test]
fn test_minimum_fare_split() {
    let s = settle(dec!(42000), twenty_percent(), 2).unwrap();

    assert_eq!(s.final_fare, Money::clp(dec!(42000)));
    assert_eq!(s.commission.amount(), dec!(8400));
    assert_eq!(s.driver_payout.amount(), dec!(33600));
}

#[test]
fn test_fare_is_rounded_before_commission_is_taken() {
    // 12345.675 → 12345.68; commission 2469.136 → 2469.14
    let s = settle(dec!(12345.675), twenty_percent(), 2).unwrap();

    assert_eq!(s.final_fare.amount(), dec!(12345.68));
    assert_eq!(s.commission.amount(), dec!(2469.14));
    assert_eq!(s.driver_payout.amount(), dec!(9876.54));
}

#[test]
fn test_clp_identity_leaves_amounts_untouched() {
    let s = settle(dec!(64000), twenty_percent(), 2).unwrap();
    let converted = s.convert(&ExchangeRate::identity()).unwrap();

    assert_eq!(converted.final_fare.amount(), dec!(64000));
    assert_eq!(converted.final_fare.currency(), &CurrencyCode::clp());
}

#[test]
fn test_conversion_divides_by_rate_without_rounding() {
    let usd = CurrencyCode::parse("USD").unwrap();
    let rate = ExchangeRate::new(usd.clone(), dec!(0.0011)).unwrap();
    let s = settle(dec!(42000), twenty_percent(), 2).unwrap();

    let converted = s.convert(&rate).unwrap();

    assert_eq!(converted.final_fare.currency(), &usd);
    assert_eq!(converted.final_fare.amount().round_dp(2), dec!(38181818.18));
    assert!(converted.final_fare.amount().scale() > 2);
    assert_eq!(converted.commission.amount(), dec!(8400) / dec!(0.0011));
    assert_eq!(converted.driver_payout.amount(), dec!(33600) / dec!(0.0011));
}

#[test]
fn test_round_trip_through_catalogue_usd_rate() {
    let rate = ExchangeRate::new(CurrencyCode::parse("USD").unwrap(), dec!(950)).unwrap();
    let s = settle(dec!(42000), twenty_percent(), 2).unwrap();

    let usd_fare = s.convert(&rate).unwrap().final_fare.amount();
    let back = rate.to_base(usd_fare).unwrap();

    assert!((back - dec!(42000)).abs() < dec!(0.000001));
    assert_eq!(usd_fare.round_dp(2), dec!(44.21));
}

proptest! {
    #[test]
    fn prop_commission_plus_payout_reconstructs_fare(
        cents in 0i64..=1_000_000_000,
        rate_bp in 0i64..10_000,
        decimals in 0u32..=4,
    ) {
        let raw = Decimal::new(cents, 2);
        let rate = Rate::fraction(Decimal::new(rate_bp, 4)).unwrap();
        let s = settle(raw, rate, decimals).unwrap();

        prop_assert!(s.is_conserved(decimals));
        prop_assert!(s.final_fare.amount() >= Decimal::ZERO);
        prop_assert!(s.driver_payout.amount() >= Decimal::ZERO);
    }

    #[test]
    fn prop_settled_amounts_respect_rounding_precision(
        thousandths in 0i64..=100_000_000,
        decimals in 0u32..=3,
    ) {
        let s = settle(Decimal::new(thousandths, 3), twenty_percent(), decimals).unwrap();

        prop_assert!(s.final_fare.amount().scale() <= decimals);
        prop_assert!(s.commission.amount().scale() <= decimals);
        prop_assert!(s.driver_payout.amount().scale() <= decimals);
    }
}
