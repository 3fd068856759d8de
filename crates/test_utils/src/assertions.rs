//! Custom Test Assertions
//!
//! Assertion helpers for quote amounts that give more meaningful failure
//! messages than a bare `assert_eq!`.

use domain_pricing::PricingResult;
use rust_decimal::Decimal;

/// Asserts that two amounts are equal within `tolerance`
///
/// # Panics
///
/// Panics if the amounts differ by more than tolerance
pub fn assert_amount_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that commission plus payout adds back to the fare within one
/// unit at `decimals` precision
///
/// # Panics
///
/// Panics if the split does not add up
pub fn assert_conserved(result: &PricingResult, decimals: u32) {
    let tolerance = Decimal::new(1, decimals);
    let sum = result.commission + result.driver_payout;
    assert!(
        (sum - result.final_fare).abs() <= tolerance,
        "Quote {} does not conserve: commission={} + payout={} != fare={}",
        result.quote_id,
        result.commission,
        result.driver_payout,
        result.final_fare
    );
}

/// Asserts a CLP quote matches an expected fare and 20% split exactly
///
/// # Panics
///
/// Panics on any mismatch
pub fn assert_clp_quote(result: &PricingResult, fare: Decimal, commission: Decimal, payout: Decimal) {
    assert!(
        result.currency.is_base(),
        "Expected a CLP quote, got {}",
        result.currency
    );
    assert_eq!(result.final_fare, fare, "final fare of {}", result.service_code);
    assert_eq!(result.commission, commission, "commission of {}", result.service_code);
    assert_eq!(result.driver_payout, payout, "payout of {}", result.service_code);
}
