//! Quote results

use chrono::{DateTime, Utc};
use core_kernel::{CurrencyCode, QuoteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::Breakdown;
use crate::catalog::ServiceMode;
use crate::request::QuoteInputs;

/// A computed quote
///
/// Amounts are in `currency`. For CLP they are rounded to the configured
/// decimals; for other currencies they are the CLP amounts divided by
/// `exchange_rate`, unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub quote_id: QuoteId,
    pub service_code: String,
    pub mode: ServiceMode,
    pub currency: CurrencyCode,
    pub final_fare: Decimal,
    pub commission: Decimal,
    pub driver_payout: Decimal,
    /// CLP per one unit of `currency`
    pub exchange_rate: Decimal,
    pub breakdown: Breakdown,
    pub inputs: QuoteInputs,
    pub calculated_at: DateTime<Utc>,
}
