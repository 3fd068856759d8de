//! Rounding and settlement
//!
//! Order of operations:
//!
//! 1. round the raw fare to `rounding_decimals`
//! 2. `commission = round(fare × commission_rate)`
//! 3. `driver_payout = round(fare − commission)`
//! 4. divide all three by the exchange rate, without rounding again
//!
//! Steps 1–3 happen in CLP. Non-CLP amounts may therefore carry more decimal
//! places than `rounding_decimals`; downstream consumers rely on that
//! remainder, so it is preserved.

use core_kernel::{ExchangeRate, Money, MoneyError, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Fare split between the platform and the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub final_fare: Money,
    pub commission: Money,
    pub driver_payout: Money,
}

/// Rounds a raw CLP fare and splits it
pub fn settle(raw_fare: Decimal, commission_rate: Rate, decimals: u32) -> Result<Settlement, PricingError> {
    let final_fare = Money::clp(raw_fare).round_dp(decimals);
    let commission = commission_rate.apply(&final_fare)?.round_dp(decimals);
    let driver_payout = final_fare.checked_sub(&commission)?.round_dp(decimals);

    Ok(Settlement {
        final_fare,
        commission,
        driver_payout,
    })
}

impl Settlement {
    /// Expresses every amount in the rate's target currency
    pub fn convert(&self, rate: &ExchangeRate) -> Result<Settlement, MoneyError> {
        Ok(Settlement {
            final_fare: self.final_fare.convert(rate)?,
            commission: self.commission.convert(rate)?,
            driver_payout: self.driver_payout.convert(rate)?,
        })
    }

    /// True when commission and payout add back up to the fare within one
    /// unit at `decimals` precision
    pub fn is_conserved(&self, decimals: u32) -> bool {
        let tolerance = Decimal::new(1, decimals);
        match self.commission.checked_add(&self.driver_payout) {
            Ok(sum) => (sum.amount() - self.final_fare.amount()).abs() <= tolerance,
            Err(_) => false,
        }
    }
}
