//! Pricing Domain Ports
//!
//! The quote engine consumes reference data (settings, services, factors,
//! exchange rates) and feeds an audit sink through a single port,
//! [`PricingProviderPort`]. Any backend is acceptable as long as it honours
//! the error semantics below:
//!
//! | Operation | Missing data |
//! |-----------|--------------|
//! | `get_service_by_code` | `PortError::NotFound` (also for inactive services) |
//! | `get_*_factor` | `PortError::NotFound` |
//! | `get_currency_rate` | `PortError::NotFound`; `CLP` always resolves to `1` |
//!
//! Any other `PortError` is treated by the engine as an internal failure.
//!
//! # Adapters
//!
//! - **In-memory catalogue** (infra_db): seeded reference data
//! - **PostgreSQL** (infra_db): `pricing_*` tables
//! - **Mock** (this crate, `mock` feature): recording test double
//!
//! ```rust,ignore
//! let provider: Arc<dyn PricingProviderPort> = match config.pricing_source {
//!     PricingSource::Memory => Arc::new(InMemoryPricingCatalog::with_default_catalog()),
//!     PricingSource::Postgres => Arc::new(PostgresPricingAdapter::new(pool)),
//! };
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError};

use crate::catalog::{PricingService, PricingSettings};
use crate::request::PricingRequest;
use crate::result::PricingResult;

/// Source of pricing reference data and sink for quote audits
#[async_trait]
pub trait PricingProviderPort: DomainPort + HealthCheckable {
    /// Global pricing constants
    async fn get_settings(&self) -> Result<PricingSettings, PortError>;

    /// An active service by code
    async fn get_service_by_code(&self, code: &str) -> Result<PricingService, PortError>;

    async fn get_vehicle_factor(&self, vehicle_type_id: &str) -> Result<Decimal, PortError>;

    async fn get_segment_factor(&self, segment_id: &str) -> Result<Decimal, PortError>;

    async fn get_zone_factor(&self, zone_id: &str) -> Result<Decimal, PortError>;

    /// The generic schedule factor
    async fn get_schedule_factor(&self, schedule_id: &str) -> Result<Decimal, PortError>;

    /// The schedule factor as seen by one service
    ///
    /// Adapters with a `(service_code, schedule_id)` override table consult
    /// it first. The default has no overrides.
    async fn get_schedule_factor_for_service(
        &self,
        schedule_id: &str,
        _service_code: &str,
    ) -> Result<Decimal, PortError> {
        self.get_schedule_factor(schedule_id).await
    }

    /// CLP per one unit of `currency_code`
    async fn get_currency_rate(&self, currency_code: &str) -> Result<Decimal, PortError>;

    /// Records a computed quote
    async fn audit_quote(
        &self,
        request: &PricingRequest,
        result: &PricingResult,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError>;
}

/// Mock implementation for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;
    use tokio::sync::RwLock;
    use core_kernel::{AdapterHealth, HealthCheckResult};

    /// Operation names recorded by [`MockPricingPort`]
    pub mod ops {
        pub const GET_SETTINGS: &str = "get_settings";
        pub const GET_SERVICE: &str = "get_service_by_code";
        pub const GET_VEHICLE_FACTOR: &str = "get_vehicle_factor";
        pub const GET_SEGMENT_FACTOR: &str = "get_segment_factor";
        pub const GET_ZONE_FACTOR: &str = "get_zone_factor";
        pub const GET_SCHEDULE_FACTOR: &str = "get_schedule_factor";
        pub const GET_CURRENCY_RATE: &str = "get_currency_rate";
        pub const AUDIT_QUOTE: &str = "audit_quote";

        /// Every factor lookup
        pub const FACTOR_LOOKUPS: [&str; 4] = [
            GET_VEHICLE_FACTOR,
            GET_SEGMENT_FACTOR,
            GET_ZONE_FACTOR,
            GET_SCHEDULE_FACTOR,
        ];
    }

    /// A single recorded audit
    #[derive(Debug, Clone)]
    pub struct AuditRecord {
        pub request: PricingRequest,
        pub result: PricingResult,
        pub correlation_id: Option<String>,
    }

    /// In-memory, call-recording implementation of PricingProviderPort
    ///
    /// Operations can be made to fail or to stall, which is how timeout,
    /// cancellation and audit-failure paths are exercised.
    #[derive(Debug, Default)]
    pub struct MockPricingPort {
        settings: RwLock<Option<PricingSettings>>,
        services: RwLock<HashMap<String, PricingService>>,
        vehicle_factors: RwLock<HashMap<String, Decimal>>,
        segment_factors: RwLock<HashMap<String, Decimal>>,
        zone_factors: RwLock<HashMap<String, Decimal>>,
        schedule_factors: RwLock<HashMap<String, Decimal>>,
        schedule_overrides: RwLock<HashMap<(String, String), Decimal>>,
        currency_rates: RwLock<HashMap<String, Decimal>>,
        failing: RwLock<HashSet<&'static str>>,
        delays: RwLock<HashMap<&'static str, Duration>>,
        calls: RwLock<Vec<&'static str>>,
        audits: RwLock<Vec<AuditRecord>>,
    }

    impl MockPricingPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_settings(mut self, settings: PricingSettings) -> Self {
            *self.settings.get_mut() = Some(settings);
            self
        }

        pub fn with_service(mut self, service: PricingService) -> Self {
            self.services.get_mut().insert(service.code.clone(), service);
            self
        }

        pub fn with_vehicle_factor(mut self, id: &str, factor: Decimal) -> Self {
            self.vehicle_factors.get_mut().insert(id.to_string(), factor);
            self
        }

        pub fn with_segment_factor(mut self, id: &str, factor: Decimal) -> Self {
            self.segment_factors.get_mut().insert(id.to_string(), factor);
            self
        }

        pub fn with_zone_factor(mut self, id: &str, factor: Decimal) -> Self {
            self.zone_factors.get_mut().insert(id.to_string(), factor);
            self
        }

        pub fn with_schedule_factor(mut self, id: &str, factor: Decimal) -> Self {
            self.schedule_factors.get_mut().insert(id.to_string(), factor);
            self
        }

        pub fn with_schedule_override(mut self, service_code: &str, schedule_id: &str, factor: Decimal) -> Self {
            self.schedule_overrides
                .get_mut()
                .insert((service_code.to_string(), schedule_id.to_string()), factor);
            self
        }

        pub fn with_currency_rate(mut self, code: &str, rate: Decimal) -> Self {
            self.currency_rates.get_mut().insert(code.to_string(), rate);
            self
        }

        /// Makes `operation` fail with a connection error
        pub fn failing(mut self, operation: &'static str) -> Self {
            self.failing.get_mut().insert(operation);
            self
        }

        /// Makes `operation` sleep before answering
        pub fn delayed(mut self, operation: &'static str, delay: Duration) -> Self {
            self.delays.get_mut().insert(operation, delay);
            self
        }

        /// Operations invoked so far, in order
        pub async fn calls(&self) -> Vec<&'static str> {
            self.calls.read().await.clone()
        }

        /// Number of times `operation` was invoked
        pub async fn call_count(&self, operation: &str) -> usize {
            self.calls.read().await.iter().filter(|op| **op == operation).count()
        }

        /// Number of factor lookups of any dimension
        pub async fn factor_call_count(&self) -> usize {
            self.calls
                .read()
                .await
                .iter()
                .filter(|op| ops::FACTOR_LOOKUPS.contains(*op))
                .count()
        }

        /// Audits recorded so far
        pub async fn audits(&self) -> Vec<AuditRecord> {
            self.audits.read().await.clone()
        }

        async fn enter(&self, operation: &'static str) -> Result<(), PortError> {
            self.calls.write().await.push(operation);
            let delay = self.delays.read().await.get(operation).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.read().await.contains(operation) {
                return Err(PortError::connection(format!("mock failure in {}", operation)));
            }
            Ok(())
        }

        async fn lookup(
            map: &RwLock<HashMap<String, Decimal>>,
            entity: &str,
            id: &str,
        ) -> Result<Decimal, PortError> {
            map.read()
                .await
                .get(id)
                .copied()
                .ok_or_else(|| PortError::not_found(entity, id))
        }
    }

    impl DomainPort for MockPricingPort {}

    #[async_trait]
    impl HealthCheckable for MockPricingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::new("mock-pricing-port", AdapterHealth::Healthy, 0)
                .with_message("Mock adapter always healthy")
        }
    }

    #[async_trait]
    impl PricingProviderPort for MockPricingPort {
        async fn get_settings(&self) -> Result<PricingSettings, PortError> {
            self.enter(ops::GET_SETTINGS).await?;
            self.settings
                .read()
                .await
                .clone()
                .ok_or_else(|| PortError::not_found("PricingSettings", "global"))
        }

        async fn get_service_by_code(&self, code: &str) -> Result<PricingService, PortError> {
            self.enter(ops::GET_SERVICE).await?;
            self.services
                .read()
                .await
                .get(code)
                .filter(|s| s.is_active())
                .cloned()
                .ok_or_else(|| PortError::not_found("PricingService", code))
        }

        async fn get_vehicle_factor(&self, vehicle_type_id: &str) -> Result<Decimal, PortError> {
            self.enter(ops::GET_VEHICLE_FACTOR).await?;
            Self::lookup(&self.vehicle_factors, "VehicleFactor", vehicle_type_id).await
        }

        async fn get_segment_factor(&self, segment_id: &str) -> Result<Decimal, PortError> {
            self.enter(ops::GET_SEGMENT_FACTOR).await?;
            Self::lookup(&self.segment_factors, "SegmentFactor", segment_id).await
        }

        async fn get_zone_factor(&self, zone_id: &str) -> Result<Decimal, PortError> {
            self.enter(ops::GET_ZONE_FACTOR).await?;
            Self::lookup(&self.zone_factors, "ZoneFactor", zone_id).await
        }

        async fn get_schedule_factor(&self, schedule_id: &str) -> Result<Decimal, PortError> {
            self.enter(ops::GET_SCHEDULE_FACTOR).await?;
            Self::lookup(&self.schedule_factors, "ScheduleFactor", schedule_id).await
        }

        async fn get_schedule_factor_for_service(
            &self,
            schedule_id: &str,
            service_code: &str,
        ) -> Result<Decimal, PortError> {
            let key = (service_code.to_string(), schedule_id.to_string());
            let overridden = self.schedule_overrides.read().await.get(&key).copied();
            match overridden {
                Some(factor) => {
                    self.enter(ops::GET_SCHEDULE_FACTOR).await?;
                    Ok(factor)
                }
                None => self.get_schedule_factor(schedule_id).await,
            }
        }

        async fn get_currency_rate(&self, currency_code: &str) -> Result<Decimal, PortError> {
            self.enter(ops::GET_CURRENCY_RATE).await?;
            if currency_code == core_kernel::BASE_CURRENCY {
                return Ok(Decimal::ONE);
            }
            self.currency_rates
                .read()
                .await
                .get(currency_code)
                .copied()
                .ok_or_else(|| PortError::not_found("CurrencyRate", currency_code))
        }

        async fn audit_quote(
            &self,
            request: &PricingRequest,
            result: &PricingResult,
            metadata: &OperationMetadata,
        ) -> Result<(), PortError> {
            self.enter(ops::AUDIT_QUOTE).await?;
            self.audits.write().await.push(AuditRecord {
                request: request.clone(),
                result: result.clone(),
                correlation_id: metadata.correlation_id.clone(),
            });
            Ok(())
        }
    }
}
