//! Fare Pricing Domain
//!
//! This crate turns a ride request into a final fare, a platform commission
//! and a driver payout.
//!
//! # Components
//!
//! - [`validation`]: mode-dependent request checks
//! - [`calculator`]: transfer and tour formulas with a traceable breakdown
//! - [`settlement`]: rounding, commission split and currency conversion
//! - [`ports`]: the reference data provider and audit sink
//! - [`services`]: the quote orchestrator
//!
//! # Examples
//!
//! ```rust
//! use core_kernel::{CurrencyCode, Rate};
//! use domain_pricing::{calculate_fare, settle, PricingFactors, PricingRequest, PricingService, PricingSettings};
//! use rust_decimal_macros::dec;
//!
//! let settings = PricingSettings {
//!     base_per_km_clp: dec!(1200),
//!     commission_rate: Rate::new(dec!(0.20)),
//!     default_currency: CurrencyCode::clp(),
//!     rounding_decimals: 2,
//! };
//! let service = PricingService::transfer("T004", "Aeropuerto", dec!(42000));
//! let request = PricingRequest::builder("T004", "urbana", "normal", CurrencyCode::clp())
//!     .distance_km(dec!(10))
//!     .vehicle_type_id("van_estandar")
//!     .segment_id("B2C")
//!     .build()
//!     .unwrap();
//!
//! let fare = calculate_fare(&request, &service, &PricingFactors::default(), &settings).unwrap();
//! let settlement = settle(fare.raw_fare, settings.commission_rate, settings.rounding_decimals).unwrap();
//!
//! assert_eq!(settlement.final_fare.amount(), dec!(42000));
//! assert_eq!(settlement.commission.amount(), dec!(8400));
//! assert_eq!(settlement.driver_payout.amount(), dec!(33600));
//! ```

pub mod catalog;
pub mod request;
pub mod result;
pub mod error;
pub mod validation;
pub mod calculator;
pub mod settlement;
pub mod ports;
pub mod services;

pub use catalog::{PricingFactors, PricingService, PricingSettings, ServiceMode, ServiceStatus};
pub use request::{PricingRequest, PricingRequestBuilder, QuoteInputs};
pub use result::PricingResult;
pub use error::{FactorDimension, PricingError};
pub use validation::{validate, MAX_DISTANCE_KM};
pub use calculator::{
    calculate_fare, Breakdown, FareComputation, STOP_SURCHARGE_CLP, WAIT_HOUR_SURCHARGE_CLP,
};
pub use settlement::{settle, Settlement};
pub use ports::PricingProviderPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPricingPort;
pub use services::{CancelHandle, QuoteConfig, QuoteContext, QuoteService};
