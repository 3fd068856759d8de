//! In-memory pricing catalogue
//!
//! Serves the reference catalogue (or any other table contents) from memory
//! and keeps a bounded audit log. This is the default provider of the API
//! binary and the backend of most tests.
//!
//! # Reference Catalogue
//!
//! | Table | Contents |
//! |-------|----------|
//! | settings | 1200 CLP/km, 20% commission, CLP, 2 decimals |
//! | services | T003, T004, T009 (transfer); T014, T015 (tour) |
//! | vehicles | van, minibus, bus (estandar/premium), sedan_ejecutivo, suv_premium |
//! | segments | B2C 1.0, B2B 0.9 |
//! | zones | urbana 1.0, mixta 1.1, rural 1.2, interregional 1.3 |
//! | schedules | normal 1.0, punta 1.3, nocturno 1.2 |
//! | overrides | (T015, punta) 1.2 |
//! | currencies | CLP 1, PEN 235, USD 950 |

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, CurrencyCode, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError, Rate, BASE_CURRENCY,
};
use domain_pricing::{
    PricingProviderPort, PricingRequest, PricingResult, PricingService, PricingSettings,
};

use crate::audit::QuoteAuditRecord;

/// Default number of audit records retained
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Tables {
    settings: Option<PricingSettings>,
    services: HashMap<String, PricingService>,
    vehicle_factors: HashMap<String, Decimal>,
    segment_factors: HashMap<String, Decimal>,
    zone_factors: HashMap<String, Decimal>,
    schedule_factors: HashMap<String, Decimal>,
    schedule_overrides: HashMap<(String, String), Decimal>,
    currency_rates: HashMap<String, Decimal>,
}

/// Pricing provider backed by in-process tables
#[derive(Debug)]
pub struct InMemoryPricingCatalog {
    tables: RwLock<Tables>,
    audit_log: RwLock<VecDeque<QuoteAuditRecord>>,
    audit_capacity: usize,
}

impl Default for InMemoryPricingCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl InMemoryPricingCatalog {
    /// Creates a catalogue with no data at all
    pub fn empty() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            audit_log: RwLock::new(VecDeque::new()),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }

    /// Creates a catalogue seeded with the reference data
    pub fn with_default_catalog() -> Self {
        let mut tables = Tables {
            settings: Some(PricingSettings {
                base_per_km_clp: dec!(1200),
                commission_rate: Rate::new(dec!(0.20)),
                default_currency: CurrencyCode::clp(),
                rounding_decimals: 2,
            }),
            ..Tables::default()
        };

        for service in [
            PricingService::transfer("T003", "Traslado Urbano", dec!(12000)),
            PricingService::transfer("T004", "Traslado Aeropuerto", dec!(42000)),
            PricingService::transfer("T009", "Ruta Integrada", dec!(36000)),
            PricingService::tour("T014", "Tour Viña del Mar", dec!(250000), dec!(350000)),
            PricingService::tour("T015", "Tour Cajón del Maipo", dec!(250000), dec!(250000)),
        ] {
            tables.services.insert(service.code.clone(), service);
        }

        fill(&mut tables.vehicle_factors, &[
            ("van_estandar", dec!(1.0)),
            ("van_premium", dec!(1.4)),
            ("minibus_estandar", dec!(1.4)),
            ("minibus_premium", dec!(2.0)),
            ("bus_estandar", dec!(2.0)),
            ("bus_premium", dec!(2.5)),
            ("sedan_ejecutivo", dec!(1.2)),
            ("suv_premium", dec!(2.0)),
        ]);
        fill(&mut tables.segment_factors, &[("B2C", dec!(1.0)), ("B2B", dec!(0.9))]);
        fill(&mut tables.zone_factors, &[
            ("urbana", dec!(1.0)),
            ("mixta", dec!(1.1)),
            ("rural", dec!(1.2)),
            ("interregional", dec!(1.3)),
        ]);
        fill(&mut tables.schedule_factors, &[
            ("normal", dec!(1.0)),
            ("punta", dec!(1.3)),
            ("nocturno", dec!(1.2)),
        ]);
        tables
            .schedule_overrides
            .insert(("T015".to_string(), "punta".to_string()), dec!(1.2));
        fill(&mut tables.currency_rates, &[
            ("CLP", dec!(1)),
            ("PEN", dec!(235)),
            ("USD", dec!(950)),
        ]);

        Self {
            tables: RwLock::new(tables),
            ..Self::empty()
        }
    }

    /// Limits how many audit records are retained; oldest go first
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity.max(1);
        self
    }

    pub async fn set_settings(&self, settings: PricingSettings) {
        self.tables.write().await.settings = Some(settings);
    }

    pub async fn upsert_service(&self, service: PricingService) {
        self.tables.write().await.services.insert(service.code.clone(), service);
    }

    pub async fn set_vehicle_factor(&self, id: &str, factor: Decimal) {
        self.tables.write().await.vehicle_factors.insert(id.to_string(), factor);
    }

    pub async fn set_segment_factor(&self, id: &str, factor: Decimal) {
        self.tables.write().await.segment_factors.insert(id.to_string(), factor);
    }

    pub async fn set_zone_factor(&self, id: &str, factor: Decimal) {
        self.tables.write().await.zone_factors.insert(id.to_string(), factor);
    }

    pub async fn set_schedule_factor(&self, id: &str, factor: Decimal) {
        self.tables.write().await.schedule_factors.insert(id.to_string(), factor);
    }

    /// Adds a `(service_code, schedule_id)` exception to the schedule table
    pub async fn set_schedule_override(&self, service_code: &str, schedule_id: &str, factor: Decimal) {
        self.tables
            .write()
            .await
            .schedule_overrides
            .insert((service_code.to_string(), schedule_id.to_string()), factor);
    }

    pub async fn set_currency_rate(&self, code: &str, rate: Decimal) {
        self.tables.write().await.currency_rates.insert(code.to_string(), rate);
    }

    /// Audit records, oldest first
    pub async fn audit_log(&self) -> Vec<QuoteAuditRecord> {
        self.audit_log.read().await.iter().cloned().collect()
    }

    async fn factor(
        &self,
        select: impl FnOnce(&Tables) -> Option<Decimal>,
        entity: &str,
        id: &str,
    ) -> Result<Decimal, PortError> {
        let tables = self.tables.read().await;
        select(&tables).ok_or_else(|| PortError::not_found(entity, id))
    }
}

fn fill(table: &mut HashMap<String, Decimal>, rows: &[(&str, Decimal)]) {
    table.extend(rows.iter().map(|(id, factor)| (id.to_string(), *factor)));
}

impl DomainPort for InMemoryPricingCatalog {}

#[async_trait]
impl HealthCheckable for InMemoryPricingCatalog {
    async fn health_check(&self) -> HealthCheckResult {
        let tables = self.tables.read().await;
        if tables.settings.is_some() {
            HealthCheckResult::new("in-memory-pricing-catalog", AdapterHealth::Healthy, 0)
        } else {
            HealthCheckResult::new("in-memory-pricing-catalog", AdapterHealth::Degraded, 0)
                .with_message("Pricing settings are not configured")
        }
    }
}

#[async_trait]
impl PricingProviderPort for InMemoryPricingCatalog {
    async fn get_settings(&self) -> Result<PricingSettings, PortError> {
        self.tables
            .read()
            .await
            .settings
            .clone()
            .ok_or_else(|| PortError::not_found("PricingSettings", "global"))
    }

    #[instrument(skip(self))]
    async fn get_service_by_code(&self, code: &str) -> Result<PricingService, PortError> {
        let service = self
            .tables
            .read()
            .await
            .services
            .get(code)
            .filter(|s| s.is_active())
            .cloned()
            .ok_or_else(|| PortError::not_found("PricingService", code))?;
        debug!(mode = %service.mode, "Retrieved service");
        Ok(service)
    }

    async fn get_vehicle_factor(&self, vehicle_type_id: &str) -> Result<Decimal, PortError> {
        self.factor(|t| t.vehicle_factors.get(vehicle_type_id).copied(), "VehicleFactor", vehicle_type_id)
            .await
    }

    async fn get_segment_factor(&self, segment_id: &str) -> Result<Decimal, PortError> {
        self.factor(|t| t.segment_factors.get(segment_id).copied(), "SegmentFactor", segment_id)
            .await
    }

    async fn get_zone_factor(&self, zone_id: &str) -> Result<Decimal, PortError> {
        self.factor(|t| t.zone_factors.get(zone_id).copied(), "ZoneFactor", zone_id)
            .await
    }

    async fn get_schedule_factor(&self, schedule_id: &str) -> Result<Decimal, PortError> {
        self.factor(|t| t.schedule_factors.get(schedule_id).copied(), "ScheduleFactor", schedule_id)
            .await
    }

    #[instrument(skip(self))]
    async fn get_schedule_factor_for_service(
        &self,
        schedule_id: &str,
        service_code: &str,
    ) -> Result<Decimal, PortError> {
        let key = (service_code.to_string(), schedule_id.to_string());
        let overridden = self.tables.read().await.schedule_overrides.get(&key).copied();
        if let Some(factor) = overridden {
            debug!(factor = %factor, "Using service-specific schedule factor");
            return Ok(factor);
        }
        self.get_schedule_factor(schedule_id).await
    }

    async fn get_currency_rate(&self, currency_code: &str) -> Result<Decimal, PortError> {
        if currency_code == BASE_CURRENCY {
            return Ok(Decimal::ONE);
        }
        self.factor(|t| t.currency_rates.get(currency_code).copied(), "CurrencyRate", currency_code)
            .await
    }

    #[instrument(skip_all, fields(quote_id = %result.quote_id))]
    async fn audit_quote(
        &self,
        request: &PricingRequest,
        result: &PricingResult,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError> {
        let record = QuoteAuditRecord::from_quote(request, result, metadata)?;
        let mut log = self.audit_log.write().await;
        while log.len() >= self.audit_capacity {
            log.pop_front();
        }
        log.push_back(record);
        debug!(retained = log.len(), "Quote audited");
        Ok(())
    }
}
