//! PostgreSQL pricing adapter
//!
//! Reads the pricing tables created by the workspace migrations and writes
//! quote audit rows. Row types stay private to this module; callers only see
//! domain values through [`PricingProviderPort`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresPricingAdapter};
//! use domain_pricing::QuoteService;
//! use std::sync::Arc;
//!
//! let pool = create_pool(DatabaseConfig::new(url).with_migrations()).await?;
//! let quotes = QuoteService::new(Arc::new(PostgresPricingAdapter::new(pool)));
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, CurrencyCode, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError, Rate, BASE_CURRENCY,
};
use domain_pricing::{
    PricingProviderPort, PricingRequest, PricingResult, PricingService, PricingSettings,
    ServiceMode, ServiceStatus,
};

use crate::audit::QuoteAuditRecord;
use crate::error::DatabaseError;

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    base_per_km_clp: Decimal,
    commission_rate: Decimal,
    default_currency: String,
    rounding_decimals: i32,
}

impl TryFrom<SettingsRow> for PricingSettings {
    type Error = DatabaseError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        let commission_rate = Rate::fraction(row.commission_rate)
            .map_err(|e| DatabaseError::SerializationError(format!("commission_rate: {}", e)))?;
        let default_currency = CurrencyCode::parse(row.default_currency.trim())
            .map_err(|e| DatabaseError::SerializationError(format!("default_currency: {}", e)))?;
        let rounding_decimals = u32::try_from(row.rounding_decimals).map_err(|_| {
            DatabaseError::SerializationError(format!(
                "rounding_decimals: {} is negative",
                row.rounding_decimals
            ))
        })?;

        Ok(PricingSettings {
            base_per_km_clp: row.base_per_km_clp,
            commission_rate,
            default_currency,
            rounding_decimals,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    code: String,
    name: String,
    mode: String,
    min_fare_clp: Decimal,
    base_flat_clp: Decimal,
    is_active: bool,
}

impl From<ServiceRow> for PricingService {
    fn from(row: ServiceRow) -> Self {
        PricingService {
            code: row.code,
            name: row.name,
            mode: ServiceMode::from(row.mode.as_str()),
            min_fare_clp: row.min_fare_clp,
            base_flat_clp: row.base_flat_clp,
            status: if row.is_active {
                ServiceStatus::Active
            } else {
                ServiceStatus::Inactive
            },
        }
    }
}

/// PostgreSQL-backed implementation of [`PricingProviderPort`]
///
/// Every lookup is a single-row primary key read. Missing rows surface as
/// `PortError::NotFound` so the quote service can map them to the matching
/// client error.
#[derive(Debug, Clone)]
pub struct PostgresPricingAdapter {
    pool: PgPool,
}

impl PostgresPricingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn factor(&self, sql: &str, entity: &str, id: &str) -> Result<Decimal, PortError> {
        sqlx::query_scalar::<_, Decimal>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?
            .ok_or_else(|| PortError::not_found(entity, id))
    }
}

impl DomainPort for PostgresPricingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPricingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::new("postgres-pricing-adapter", AdapterHealth::Healthy, latency_ms),
            Err(e) => HealthCheckResult::new("postgres-pricing-adapter", AdapterHealth::Unhealthy, latency_ms)
                .with_message(format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl PricingProviderPort for PostgresPricingAdapter {
    #[instrument(skip(self))]
    async fn get_settings(&self) -> Result<PricingSettings, PortError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT base_per_km_clp, commission_rate, default_currency, rounding_decimals
            FROM pricing_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?
        .ok_or_else(|| PortError::not_found("PricingSettings", "global"))?;

        Ok(PricingSettings::try_from(row)?)
    }

    #[instrument(skip(self))]
    async fn get_service_by_code(&self, code: &str) -> Result<PricingService, PortError> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT code, name, mode, min_fare_clp, base_flat_clp, is_active
            FROM pricing_services
            WHERE code = $1 AND is_active
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?
        .ok_or_else(|| PortError::not_found("PricingService", code))?;

        debug!(mode = %row.mode, "Retrieved service");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn get_vehicle_factor(&self, vehicle_type_id: &str) -> Result<Decimal, PortError> {
        self.factor(
            "SELECT factor FROM pricing_vehicle_factors WHERE vehicle_type_id = $1",
            "VehicleFactor",
            vehicle_type_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_segment_factor(&self, segment_id: &str) -> Result<Decimal, PortError> {
        self.factor(
            "SELECT factor FROM pricing_segment_factors WHERE segment_id = $1",
            "SegmentFactor",
            segment_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_zone_factor(&self, zone_id: &str) -> Result<Decimal, PortError> {
        self.factor(
            "SELECT factor FROM pricing_zone_factors WHERE zone_id = $1",
            "ZoneFactor",
            zone_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_schedule_factor(&self, schedule_id: &str) -> Result<Decimal, PortError> {
        self.factor(
            "SELECT factor FROM pricing_schedule_factors WHERE schedule_id = $1",
            "ScheduleFactor",
            schedule_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_schedule_factor_for_service(
        &self,
        schedule_id: &str,
        service_code: &str,
    ) -> Result<Decimal, PortError> {
        let overridden = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT factor
            FROM pricing_schedule_overrides
            WHERE service_code = $1 AND schedule_id = $2
            "#,
        )
        .bind(service_code)
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        match overridden {
            Some(factor) => {
                debug!(factor = %factor, "Using service-specific schedule factor");
                Ok(factor)
            }
            None => self.get_schedule_factor(schedule_id).await,
        }
    }

    #[instrument(skip(self))]
    async fn get_currency_rate(&self, currency_code: &str) -> Result<Decimal, PortError> {
        if currency_code == BASE_CURRENCY {
            return Ok(Decimal::ONE);
        }
        self.factor(
            "SELECT rate FROM pricing_currency_rates WHERE currency_code = $1",
            "CurrencyRate",
            currency_code,
        )
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

        sqlx::query(
            r#"
            INSERT INTO pricing_quote_audit (
                quote_id, service_code, mode, currency_code,
                final_fare, commission, driver_payout, exchange_rate,
                inputs, breakdown, correlation_id, calculated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.quote_id)
        .bind(&record.service_code)
        .bind(&record.mode)
        .bind(&record.currency_code)
        .bind(record.final_fare)
        .bind(record.commission)
        .bind(record.driver_payout)
        .bind(record.exchange_rate)
        .bind(&record.inputs)
        .bind(&record.breakdown)
        .bind(&record.correlation_id)
        .bind(record.calculated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        debug!("Quote audit row written");
        Ok(())
    }
}
