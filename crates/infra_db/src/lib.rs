//! Infrastructure Layer for the fare engine
//!
//! This crate provides the storage backends behind the pricing provider port:
//! a seeded in-memory catalogue and a PostgreSQL adapter built on SQLx.
//!
//! # Architecture
//!
//! The domain only knows [`domain_pricing::PricingProviderPort`]. Adapters
//! translate rows into domain values and database failures into
//! [`core_kernel::PortError`], so nothing from SQLx crosses the boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresPricingAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/fares")).await?;
//! let provider = PostgresPricingAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod audit;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use audit::QuoteAuditRecord;
pub use adapters::{InMemoryPricingCatalog, PostgresPricingAdapter};
