//! Quote requests
//!
//! A [`PricingRequest`] is immutable once built. Which optional fields are
//! actually required depends on the resolved service mode, so those checks
//! live in [`validation`](crate::validation) rather than in the builder.

use core_kernel::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Input to a quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingRequest {
    service_code: String,
    distance_km: Option<Decimal>,
    vehicle_type_id: Option<String>,
    segment_id: Option<String>,
    zone_id: String,
    schedule_id: String,
    currency_code: CurrencyCode,
    stops: Option<u32>,
    wait_hours: Option<Decimal>,
}

impl PricingRequest {
    /// Starts a request with its always-required fields
    pub fn builder(
        service_code: impl Into<String>,
        zone_id: impl Into<String>,
        schedule_id: impl Into<String>,
        currency_code: CurrencyCode,
    ) -> PricingRequestBuilder {
        PricingRequestBuilder {
            service_code: service_code.into(),
            distance_km: None,
            vehicle_type_id: None,
            segment_id: None,
            zone_id: zone_id.into(),
            schedule_id: schedule_id.into(),
            currency_code,
            stops: None,
            wait_hours: None,
        }
    }

    pub fn service_code(&self) -> &str {
        &self.service_code
    }

    pub fn distance_km(&self) -> Option<Decimal> {
        self.distance_km
    }

    pub fn vehicle_type_id(&self) -> Option<&str> {
        self.vehicle_type_id.as_deref()
    }

    pub fn segment_id(&self) -> Option<&str> {
        self.segment_id.as_deref()
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn schedule_id(&self) -> &str {
        &self.schedule_id
    }

    pub fn currency_code(&self) -> &CurrencyCode {
        &self.currency_code
    }

    pub fn stops(&self) -> Option<u32> {
        self.stops
    }

    pub fn wait_hours(&self) -> Option<Decimal> {
        self.wait_hours
    }

    /// Echo of the inputs a quote was computed from
    pub fn inputs(&self) -> QuoteInputs {
        QuoteInputs {
            distance_km: self.distance_km,
            vehicle_type_id: self.vehicle_type_id.clone(),
            segment_id: self.segment_id.clone(),
            zone_id: self.zone_id.clone(),
            schedule_id: self.schedule_id.clone(),
            stops: self.stops,
            wait_hours: self.wait_hours,
        }
    }
}

/// Builder for [`PricingRequest`]
#[derive(Debug, Clone)]
pub struct PricingRequestBuilder {
    service_code: String,
    distance_km: Option<Decimal>,
    vehicle_type_id: Option<String>,
    segment_id: Option<String>,
    zone_id: String,
    schedule_id: String,
    currency_code: CurrencyCode,
    stops: Option<u32>,
    wait_hours: Option<Decimal>,
}

impl PricingRequestBuilder {
    #[must_use]
    pub fn distance_km(mut self, distance_km: Decimal) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    #[must_use]
    pub fn maybe_distance_km(mut self, distance_km: Option<Decimal>) -> Self {
        self.distance_km = distance_km;
        self
    }

    /// Sets the vehicle type; blank ids are treated as absent
    #[must_use]
    pub fn vehicle_type_id(mut self, id: impl Into<String>) -> Self {
        self.vehicle_type_id = non_blank(id.into());
        self
    }

    /// Sets the customer segment; blank ids are treated as absent
    #[must_use]
    pub fn segment_id(mut self, id: impl Into<String>) -> Self {
        self.segment_id = non_blank(id.into());
        self
    }

    #[must_use]
    pub fn stops(mut self, stops: u32) -> Self {
        self.stops = Some(stops);
        self
    }

    #[must_use]
    pub fn maybe_stops(mut self, stops: Option<u32>) -> Self {
        self.stops = stops;
        self
    }

    #[must_use]
    pub fn wait_hours(mut self, hours: Decimal) -> Self {
        self.wait_hours = Some(hours);
        self
    }

    #[must_use]
    pub fn maybe_wait_hours(mut self, hours: Option<Decimal>) -> Self {
        self.wait_hours = hours;
        self
    }

    /// Finishes the request
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the service, zone or schedule id is blank
    pub fn build(self) -> Result<PricingRequest, PricingError> {
        let service_code = self.service_code.trim().to_string();
        if service_code.is_empty() {
            return Err(PricingError::invalid_input("serviceCode", "is required"));
        }
        if self.zone_id.trim().is_empty() {
            return Err(PricingError::invalid_input("zoneId", "is required"));
        }
        if self.schedule_id.trim().is_empty() {
            return Err(PricingError::invalid_input("scheduleId", "is required"));
        }

        Ok(PricingRequest {
            service_code,
            distance_km: self.distance_km,
            vehicle_type_id: self.vehicle_type_id,
            segment_id: self.segment_id,
            zone_id: self.zone_id,
            schedule_id: self.schedule_id,
            currency_code: self.currency_code,
            stops: self.stops,
            wait_hours: self.wait_hours,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// The inputs echoed back alongside a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInputs {
    pub distance_km: Option<Decimal>,
    pub vehicle_type_id: Option<String>,
    pub segment_id: Option<String>,
    pub zone_id: String,
    pub schedule_id: String,
    pub stops: Option<u32>,
    pub wait_hours: Option<Decimal>,
}
