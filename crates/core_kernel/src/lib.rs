//! Core Kernel - Foundational types and utilities for the fare engine
//!
//! This crate provides the fundamental building blocks used across the pricing
//! workspace:
//! - Money types with precise decimal arithmetic and explicit rounding
//! - Currency codes and exchange rates with a pinned conversion convention
//! - Common identifiers and the ports-and-adapters error vocabulary

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{
    Money, CurrencyCode, ExchangeRate, Rate, MoneyError,
    round_amount, BASE_CURRENCY,
};
pub use identifiers::QuoteId;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult,
    AdapterHealth, OperationMetadata,
};
