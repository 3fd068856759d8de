//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! fare engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: The reference catalogue as settings, services and a mock provider
//! - `builders`: Request builders for the reference scenarios
//! - `database`: PostgreSQL container management for adapter tests
//! - `assertions`: Assertion helpers for amounts and settlements
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
