//! Test Data Builders
//!
//! Request builders with sensible defaults, so tests spell out only the
//! fields they care about.

use core_kernel::CurrencyCode;
use domain_pricing::{PricingRequest, PricingRequestBuilder};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Builder for transfer quote requests
///
/// Defaults to a 20 km standard van ride for a B2C customer in an urban zone
/// at a normal hour, quoted in CLP.
pub struct TransferRequestBuilder {
    service_code: String,
    distance_km: Option<Decimal>,
    vehicle_type_id: Option<String>,
    segment_id: Option<String>,
    zone_id: String,
    schedule_id: String,
    currency: CurrencyCode,
    stops: Option<u32>,
    wait_hours: Option<Decimal>,
}

impl Default for TransferRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferRequestBuilder {
    pub fn new() -> Self {
        Self {
            service_code: "T004".to_string(),
            distance_km: Some(dec!(20)),
            vehicle_type_id: Some("van_estandar".to_string()),
            segment_id: Some("B2C".to_string()),
            zone_id: "urbana".to_string(),
            schedule_id: "normal".to_string(),
            currency: CurrencyCode::clp(),
            stops: None,
            wait_hours: None,
        }
    }

    pub fn service(mut self, code: &str) -> Self {
        self.service_code = code.to_string();
        self
    }

    pub fn distance_km(mut self, km: Decimal) -> Self {
        self.distance_km = Some(km);
        self
    }

    pub fn without_distance(mut self) -> Self {
        self.distance_km = None;
        self
    }

    pub fn vehicle(mut self, id: &str) -> Self {
        self.vehicle_type_id = Some(id.to_string());
        self
    }

    pub fn without_vehicle(mut self) -> Self {
        self.vehicle_type_id = None;
        self
    }

    pub fn segment(mut self, id: &str) -> Self {
        self.segment_id = Some(id.to_string());
        self
    }

    pub fn without_segment(mut self) -> Self {
        self.segment_id = None;
        self
    }

    pub fn zone(mut self, id: &str) -> Self {
        self.zone_id = id.to_string();
        self
    }

    pub fn schedule(mut self, id: &str) -> Self {
        self.schedule_id = id.to_string();
        self
    }

    /// # Panics
    ///
    /// Panics if `code` is not a three-letter code
    pub fn currency(mut self, code: &str) -> Self {
        self.currency = CurrencyCode::parse(code).expect("valid currency code");
        self
    }

    pub fn stops(mut self, stops: u32) -> Self {
        self.stops = Some(stops);
        self
    }

    pub fn wait_hours(mut self, hours: Decimal) -> Self {
        self.wait_hours = Some(hours);
        self
    }

    fn into_domain(self) -> PricingRequestBuilder {
        let mut builder = PricingRequest::builder(
            self.service_code,
            self.zone_id,
            self.schedule_id,
            self.currency,
        )
        .maybe_distance_km(self.distance_km)
        .maybe_stops(self.stops)
        .maybe_wait_hours(self.wait_hours);
        if let Some(vehicle) = self.vehicle_type_id {
            builder = builder.vehicle_type_id(vehicle);
        }
        if let Some(segment) = self.segment_id {
            builder = builder.segment_id(segment);
        }
        builder
    }

    /// # Panics
    ///
    /// Panics if the request is structurally invalid
    pub fn build(self) -> PricingRequest {
        self.into_domain().build().expect("valid transfer request")
    }
}

/// Builder for tour quote requests
///
/// Defaults to T014 in an urban zone at a normal hour, quoted in CLP.
pub struct TourRequestBuilder {
    service_code: String,
    zone_id: String,
    schedule_id: String,
    currency: CurrencyCode,
    distance_km: Option<Decimal>,
}

impl Default for TourRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TourRequestBuilder {
    pub fn new() -> Self {
        Self {
            service_code: "T014".to_string(),
            zone_id: "urbana".to_string(),
            schedule_id: "normal".to_string(),
            currency: CurrencyCode::clp(),
            distance_km: None,
        }
    }

    pub fn service(mut self, code: &str) -> Self {
        self.service_code = code.to_string();
        self
    }

    pub fn zone(mut self, id: &str) -> Self {
        self.zone_id = id.to_string();
        self
    }

    pub fn schedule(mut self, id: &str) -> Self {
        self.schedule_id = id.to_string();
        self
    }

    /// # Panics
    ///
    /// Panics if `code` is not a three-letter code
    pub fn currency(mut self, code: &str) -> Self {
        self.currency = CurrencyCode::parse(code).expect("valid currency code");
        self
    }

    /// Tours ignore distance; set it to check that it stays ignored
    pub fn distance_km(mut self, km: Decimal) -> Self {
        self.distance_km = Some(km);
        self
    }

    /// # Panics
    ///
    /// Panics if the request is structurally invalid
    pub fn build(self) -> PricingRequest {
        PricingRequest::builder(self.service_code, self.zone_id, self.schedule_id, self.currency)
            .maybe_distance_km(self.distance_km)
            .build()
            .expect("valid tour request")
    }
}
