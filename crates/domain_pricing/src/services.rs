//! Quote orchestration
//!
//! [`QuoteService`] sequences one quote:
//!
//! 1. settings lookup
//! 2. service lookup (`ServiceNotFound`)
//! 3. request validation against the service mode (`InvalidInput`)
//! 4. factor lookups: zone, service-aware schedule, and vehicle/segment for
//!    transfers only (`InvalidFactors`)
//! 5. mode formula, rounding and settlement
//! 6. exchange rate lookup, skipped for CLP (`InvalidCurrency`)
//! 7. conversion, best-effort audit, result
//!
//! The first failure aborts the quote; nothing is retried and no partial
//! result is returned. Every provider call runs under the caller's
//! [`QuoteContext`]: it is abandoned on cancellation, and bounded by the
//! earlier of the per-call timeout and the context deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use core_kernel::{ExchangeRate, HealthCheckResult, OperationMetadata, PortError, QuoteId};

use crate::calculator::calculate_fare;
use crate::catalog::{PricingFactors, PricingService, PricingSettings, ServiceMode};
use crate::error::{FactorDimension, PricingError};
use crate::ports::PricingProviderPort;
use crate::request::PricingRequest;
use crate::result::PricingResult;
use crate::settlement::settle;
use crate::validation::validate;

/// Timeouts applied by [`QuoteService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteConfig {
    /// Upper bound on any single provider lookup
    pub lookup_timeout: Duration,
    /// Upper bound on the audit call
    pub audit_timeout: Duration,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_millis(2000),
            audit_timeout: Duration::from_millis(1000),
        }
    }
}

impl QuoteConfig {
    /// Sets the per-lookup timeout
    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Sets the audit timeout
    #[must_use]
    pub fn with_audit_timeout(mut self, timeout: Duration) -> Self {
        self.audit_timeout = timeout;
        self
    }
}

/// Caller-side controls for a single quote
#[derive(Debug, Clone, Default)]
pub struct QuoteContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
    metadata: OperationMetadata,
}

impl QuoteContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aborts the quote once `deadline` passes
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Aborts the quote after `timeout` from now
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: OperationMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attaches a cancellation signal and returns its trigger
    #[must_use]
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn metadata(&self) -> &OperationMetadata {
        &self.metadata
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    async fn cancelled(&self) {
        match self.cancel.clone() {
            Some(mut rx) => {
                let handle_dropped = rx.wait_for(|cancelled| *cancelled).await.is_err();
                // A dropped handle can never cancel.
                if handle_dropped {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Trigger for a [`QuoteContext`] cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels every quote observing this handle's context
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Service that prices ride requests
///
/// Stateless apart from the injected provider; clones share it.
#[derive(Clone)]
pub struct QuoteService {
    provider: Arc<dyn PricingProviderPort>,
    config: QuoteConfig,
}

impl QuoteService {
    /// Creates a quote service with default timeouts
    pub fn new(provider: Arc<dyn PricingProviderPort>) -> Self {
        Self::with_config(provider, QuoteConfig::default())
    }

    pub fn with_config(provider: Arc<dyn PricingProviderPort>, config: QuoteConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Health of the underlying provider
    pub async fn health_check(&self) -> HealthCheckResult {
        self.provider.health_check().await
    }

    /// Prices a request
    ///
    /// # Errors
    ///
    /// - `ServiceNotFound` for an unknown or inactive service
    /// - `InvalidInput` when the request does not fit the service mode
    /// - `InvalidFactors` for an unknown vehicle, segment, zone or schedule
    /// - `InvalidCurrency` for a currency without an exchange rate
    /// - `UnsupportedMode` for a service the engine cannot price
    /// - `Cancelled` when the context is cancelled
    /// - `Internal` on provider failure, timeout or corrupt reference data
    #[instrument(
        skip(self, ctx, request),
        fields(service_code = %request.service_code(), currency = %request.currency_code())
    )]
    pub async fn calculate_price(
        &self,
        ctx: &QuoteContext,
        request: &PricingRequest,
    ) -> Result<PricingResult, PricingError> {
        let started = std::time::Instant::now();

        let settings = self.fetch_settings(ctx).await?;
        let service = self.fetch_service(ctx, request.service_code()).await?;

        if !service.mode.is_supported() {
            return Err(PricingError::UnsupportedMode(service.mode.to_string()));
        }

        validate(request, &service)?;

        let factors = self.resolve_factors(ctx, request, &service).await?;

        let fare = calculate_fare(request, &service, &factors, &settings)?;
        let settlement = settle(fare.raw_fare, settings.commission_rate, settings.rounding_decimals)?;
        debug!(
            raw_fare = %fare.raw_fare,
            final_fare = %settlement.final_fare.amount(),
            commission = %settlement.commission.amount(),
            "Fare settled in CLP"
        );

        let rate = self.resolve_rate(ctx, request).await?;
        let converted = settlement.convert(&rate)?;

        let result = PricingResult {
            quote_id: QuoteId::new(),
            service_code: service.code.clone(),
            mode: service.mode.clone(),
            currency: request.currency_code().clone(),
            final_fare: converted.final_fare.amount(),
            commission: converted.commission.amount(),
            driver_payout: converted.driver_payout.amount(),
            exchange_rate: rate.value(),
            breakdown: fare.breakdown,
            inputs: request.inputs(),
            calculated_at: Utc::now(),
        };

        info!(
            quote_id = %result.quote_id,
            mode = %result.mode,
            final_fare = %result.final_fare,
            commission = %result.commission,
            driver_payout = %result.driver_payout,
            duration_ms = started.elapsed().as_millis() as u64,
            "Price calculated"
        );

        self.audit(ctx, request, &result).await;

        Ok(result)
    }

    /// Looks up an active service
    ///
    /// # Errors
    ///
    /// `ServiceNotFound` for unknown or inactive codes, `Cancelled` or
    /// `Internal` as for [`QuoteService::calculate_price`]
    pub async fn get_service(
        &self,
        ctx: &QuoteContext,
        code: &str,
    ) -> Result<PricingService, PricingError> {
        self.fetch_service(ctx, code).await
    }

    async fn fetch_settings(&self, ctx: &QuoteContext) -> Result<PricingSettings, PricingError> {
        let settings = self
            .guarded(ctx, "settings lookup", self.provider.get_settings(), |e| {
                PricingError::internal("settings lookup", e)
            })
            .await?;
        settings.validate()?;
        Ok(settings)
    }

    async fn fetch_service(&self, ctx: &QuoteContext, code: &str) -> Result<PricingService, PricingError> {
        let service = self
            .guarded(ctx, "service lookup", self.provider.get_service_by_code(code), |e| {
                PricingError::from_service_lookup(code, e)
            })
            .await?;

        if !service.is_active() {
            debug!(service_code = %code, "Service is inactive");
            return Err(PricingError::ServiceNotFound(code.to_string()));
        }
        debug!(service_code = %code, mode = %service.mode, "Service resolved");
        Ok(service)
    }

    async fn resolve_factors(
        &self,
        ctx: &QuoteContext,
        request: &PricingRequest,
        service: &PricingService,
    ) -> Result<PricingFactors, PricingError> {
        let mut factors = PricingFactors::default();

        factors.zone = self
            .fetch_factor(
                ctx,
                FactorDimension::Zone,
                request.zone_id(),
                self.provider.get_zone_factor(request.zone_id()),
            )
            .await?;

        factors.schedule = self
            .fetch_factor(
                ctx,
                FactorDimension::Schedule,
                request.schedule_id(),
                self.provider
                    .get_schedule_factor_for_service(request.schedule_id(), &service.code),
            )
            .await?;

        if service.mode == ServiceMode::Transfer {
            let vehicle_id = request
                .vehicle_type_id()
                .ok_or_else(|| PricingError::invalid_input("vehicleTypeId", "is required for transfer services"))?;
            factors.vehicle = self
                .fetch_factor(
                    ctx,
                    FactorDimension::Vehicle,
                    vehicle_id,
                    self.provider.get_vehicle_factor(vehicle_id),
                )
                .await?;

            let segment_id = request
                .segment_id()
                .ok_or_else(|| PricingError::invalid_input("segmentId", "is required for transfer services"))?;
            factors.segment = self
                .fetch_factor(
                    ctx,
                    FactorDimension::Segment,
                    segment_id,
                    self.provider.get_segment_factor(segment_id),
                )
                .await?;
        }

        debug!(
            vehicle = %factors.vehicle,
            segment = %factors.segment,
            zone = %factors.zone,
            schedule = %factors.schedule,
            "Factors resolved"
        );
        Ok(factors)
    }

    async fn fetch_factor<F>(
        &self,
        ctx: &QuoteContext,
        dimension: FactorDimension,
        id: &str,
        lookup: F,
    ) -> Result<Decimal, PricingError>
    where
        F: Future<Output = Result<Decimal, PortError>>,
    {
        let factor = self
            .guarded(ctx, "factor lookup", lookup, |e| {
                PricingError::from_factor_lookup(dimension, id, e)
            })
            .await?;

        if factor <= Decimal::ZERO {
            warn!(dimension = %dimension, id = %id, factor = %factor, "Non-positive factor in reference data");
            return Err(PricingError::invalid_factor(dimension, id));
        }
        Ok(factor)
    }

    async fn resolve_rate(&self, ctx: &QuoteContext, request: &PricingRequest) -> Result<ExchangeRate, PricingError> {
        let currency = request.currency_code();
        if currency.is_base() {
            return Ok(ExchangeRate::identity());
        }

        let value = self
            .guarded(
                ctx,
                "currency rate lookup",
                self.provider.get_currency_rate(currency.as_str()),
                |e| PricingError::from_rate_lookup(currency.as_str(), e),
            )
            .await?;

        debug!(currency = %currency, rate = %value, "Exchange rate resolved");
        ExchangeRate::new(currency.clone(), value)
            .map_err(|e| PricingError::internal("currency rate lookup", e))
    }

    async fn audit(&self, ctx: &QuoteContext, request: &PricingRequest, result: &PricingResult) {
        let budget = ctx
            .remaining()
            .map_or(self.config.audit_timeout, |remaining| remaining.min(self.config.audit_timeout));
        if budget.is_zero() {
            warn!(quote_id = %result.quote_id, "Quote audit skipped, deadline exceeded");
            return;
        }

        let call = self.provider.audit_quote(request, result, ctx.metadata());
        let outcome = tokio::select! {
            _ = ctx.cancelled() => Err("cancelled".to_string()),
            outcome = tokio::time::timeout(budget, call) => match outcome {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {}ms", budget.as_millis())),
            },
        };

        if let Err(reason) = outcome {
            warn!(quote_id = %result.quote_id, reason = %reason, "Quote audit failed");
        }
    }

    /// Runs a provider call under the context's cancellation and deadline
    async fn guarded<T, F, M>(
        &self,
        ctx: &QuoteContext,
        operation: &str,
        call: F,
        map_err: M,
    ) -> Result<T, PricingError>
    where
        F: Future<Output = Result<T, PortError>>,
        M: FnOnce(PortError) -> PricingError,
    {
        if ctx.is_cancelled() {
            return Err(PricingError::Cancelled);
        }

        let budget = match ctx.remaining() {
            Some(remaining) if remaining.is_zero() => {
                return Err(PricingError::internal(operation, "deadline exceeded"));
            }
            Some(remaining) => remaining.min(self.config.lookup_timeout),
            None => self.config.lookup_timeout,
        };

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(PricingError::Cancelled),
            outcome = tokio::time::timeout(budget, call) => match outcome {
                Ok(result) => result.map_err(map_err),
                Err(_) => {
                    warn!(operation = %operation, budget_ms = budget.as_millis() as u64, "Provider call timed out");
                    Err(PricingError::internal(
                        operation,
                        PortError::timeout(operation, budget.as_millis() as u64),
                    ))
                }
            },
        }
    }
}

impl std::fmt::Debug for QuoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
