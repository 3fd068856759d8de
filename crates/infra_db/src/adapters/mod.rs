//! Pricing provider adapters
//!
//! Two backends implement [`domain_pricing::PricingProviderPort`]:
//!
//! - [`InMemoryPricingCatalog`]: in-process tables, seeded with the reference
//!   catalogue by default
//! - [`PostgresPricingAdapter`]: the `pricing_*` tables created by the
//!   workspace migrations
//!
//! # Usage
//!
//! ```rust
//! use infra_db::adapters::InMemoryPricingCatalog;
//! use domain_pricing::QuoteService;
//! use std::sync::Arc;
//!
//! let quotes = QuoteService::new(Arc::new(InMemoryPricingCatalog::with_default_catalog()));
//! ```

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryPricingCatalog, DEFAULT_AUDIT_CAPACITY};
pub use postgres::PostgresPricingAdapter;
