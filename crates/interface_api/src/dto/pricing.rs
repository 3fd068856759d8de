//! Pricing DTOs
//!
//! Wire shapes for the quote and service endpoints. Amounts travel as JSON
//! numbers; the domain keeps them as decimals.

use std::collections::BTreeMap;

use core_kernel::CurrencyCode;
use domain_pricing::{
    PricingError, PricingRequest, PricingResult, PricingService, QuoteInputs,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /api/v1/pricing/quote`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestDto {
    #[validate(length(min = 1, max = 16))]
    pub service_code: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub distance_km: Option<Decimal>,
    #[validate(length(min = 1, max = 64))]
    pub vehicle_type_id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub segment_id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub zone_id: String,
    #[validate(length(min = 1, max = 64))]
    pub schedule_id: String,
    #[validate(length(equal = 3))]
    pub currency_code: String,
    #[serde(rename = "paradas")]
    pub stops: Option<u32>,
    #[serde(rename = "horasEspera", default, with = "rust_decimal::serde::float_option")]
    pub wait_hours: Option<Decimal>,
}

impl TryFrom<QuoteRequestDto> for PricingRequest {
    type Error = PricingError;

    fn try_from(dto: QuoteRequestDto) -> Result<Self, Self::Error> {
        let currency = CurrencyCode::parse(&dto.currency_code)
            .map_err(|_| PricingError::invalid_input("currencyCode", "must be a three-letter code"))?;

        let mut builder = PricingRequest::builder(dto.service_code, dto.zone_id, dto.schedule_id, currency)
            .maybe_distance_km(dto.distance_km)
            .maybe_stops(dto.stops)
            .maybe_wait_hours(dto.wait_hours);
        if let Some(vehicle) = dto.vehicle_type_id {
            builder = builder.vehicle_type_id(vehicle);
        }
        if let Some(segment) = dto.segment_id {
            builder = builder.segment_id(segment);
        }
        builder.build()
    }
}

/// Echo of the inputs a quote was computed from
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInputsDto {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub distance_km: Option<Decimal>,
    pub vehicle_type_id: Option<String>,
    pub segment_id: Option<String>,
    pub zone_id: String,
    pub schedule_id: String,
    #[serde(rename = "paradas")]
    pub stops: Option<u32>,
    #[serde(rename = "horasEspera", with = "rust_decimal::serde::float_option")]
    pub wait_hours: Option<Decimal>,
}

impl From<QuoteInputs> for QuoteInputsDto {
    fn from(inputs: QuoteInputs) -> Self {
        Self {
            distance_km: inputs.distance_km,
            vehicle_type_id: inputs.vehicle_type_id,
            segment_id: inputs.segment_id,
            zone_id: inputs.zone_id,
            schedule_id: inputs.schedule_id,
            stops: inputs.stops,
            wait_hours: inputs.wait_hours,
        }
    }
}

/// Response of `POST /api/v1/pricing/quote`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote_id: Uuid,
    pub service_code: String,
    pub mode: String,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_fare: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub driver_payout: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub exchange_rate: Decimal,
    pub inputs: QuoteInputsDto,
    #[serde(serialize_with = "float_map")]
    pub breakdown: BTreeMap<String, Decimal>,
}

impl From<PricingResult> for QuoteResponse {
    fn from(result: PricingResult) -> Self {
        Self {
            quote_id: *result.quote_id.as_uuid(),
            service_code: result.service_code,
            mode: result.mode.to_string(),
            currency: result.currency.to_string(),
            final_fare: result.final_fare,
            commission: result.commission,
            driver_payout: result.driver_payout,
            exchange_rate: result.exchange_rate,
            inputs: result.inputs.into(),
            breakdown: result
                .breakdown
                .iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }
}

fn float_map<S: Serializer>(map: &BTreeMap<String, Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(map.iter().map(|(key, value)| (key, value.to_f64())))
}

/// Response of `GET /api/v1/pricing/services/:code`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub code: String,
    pub name: String,
    pub mode: String,
    #[serde(rename = "minFareCLP", with = "rust_decimal::serde::float")]
    pub min_fare_clp: Decimal,
    #[serde(rename = "baseFlatCLP", with = "rust_decimal::serde::float")]
    pub base_flat_clp: Decimal,
    pub active: bool,
}

impl From<PricingService> for ServiceResponse {
    fn from(service: PricingService) -> Self {
        Self {
            active: service.is_active(),
            code: service.code,
            name: service.name,
            mode: service.mode.to_string(),
            min_fare_clp: service.min_fare_clp,
            base_flat_clp: service.base_flat_clp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn body(json: serde_json::Value) -> QuoteRequestDto {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_wire_names() {
        let dto = body(serde_json::json!({
            "serviceCode": "T004",
            "distanceKm": 12.5,
            "vehicleTypeId": "van_estandar",
            "segmentId": "B2C",
            "zoneId": "urbana",
            "scheduleId": "normal",
            "currencyCode": "CLP",
            "paradas": 2,
            "horasEspera": 1.5
        }));

        assert_eq!(dto.distance_km, Some(dec!(12.5)));
        assert_eq!(dto.stops, Some(2));
        assert_eq!(dto.wait_hours, Some(dec!(1.5)));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let dto = body(serde_json::json!({
            "serviceCode": "T014",
            "zoneId": "mixta",
            "scheduleId": "normal",
            "currencyCode": "USD"
        }));

        let request = PricingRequest::try_from(dto).unwrap();
        assert_eq!(request.distance_km(), None);
        assert_eq!(request.currency_code().as_str(), "USD");
    }

    #[test]
    fn test_shape_validation() {
        let dto = body(serde_json::json!({
            "serviceCode": "",
            "zoneId": "urbana",
            "scheduleId": "normal",
            "currencyCode": "DOLLAR"
        }));

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("service_code"));
        assert!(fields.contains_key("currency_code"));
    }

    #[test]
    fn test_non_alphabetic_currency_rejected() {
        let dto = body(serde_json::json!({
            "serviceCode": "T004",
            "zoneId": "urbana",
            "scheduleId": "normal",
            "currencyCode": "U$D"
        }));

        let err = PricingRequest::try_from(dto).unwrap_err();
        assert_eq!(err.kind(), "INVALID_INPUT");
    }
}
