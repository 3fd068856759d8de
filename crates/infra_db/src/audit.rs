//! Quote audit records
//!
//! The flattened form of a quote kept by every provider backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{OperationMetadata, PortError};
use domain_pricing::{PricingRequest, PricingResult};

/// One audited quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteAuditRecord {
    pub quote_id: Uuid,
    pub service_code: String,
    pub mode: String,
    pub currency_code: String,
    pub final_fare: Decimal,
    pub commission: Decimal,
    pub driver_payout: Decimal,
    pub exchange_rate: Decimal,
    pub inputs: serde_json::Value,
    pub breakdown: serde_json::Value,
    pub correlation_id: Option<String>,
    pub calculated_at: DateTime<Utc>,
}

impl QuoteAuditRecord {
    /// Flattens a computed quote
    ///
    /// # Errors
    ///
    /// Returns `PortError::Transformation` if the inputs or breakdown cannot
    /// be serialized
    pub fn from_quote(
        request: &PricingRequest,
        result: &PricingResult,
        metadata: &OperationMetadata,
    ) -> Result<Self, PortError> {
        let inputs = serde_json::to_value(request.inputs())
            .map_err(|e| PortError::transformation(format!("quote inputs: {}", e)))?;
        let breakdown = serde_json::to_value(&result.breakdown)
            .map_err(|e| PortError::transformation(format!("quote breakdown: {}", e)))?;

        Ok(Self {
            quote_id: *result.quote_id.as_uuid(),
            service_code: result.service_code.clone(),
            mode: result.mode.to_string(),
            currency_code: result.currency.to_string(),
            final_fare: result.final_fare,
            commission: result.commission,
            driver_payout: result.driver_payout,
            exchange_rate: result.exchange_rate,
            inputs,
            breakdown,
            correlation_id: metadata.correlation_id.clone(),
            calculated_at: result.calculated_at,
        })
    }
}
