//! HTTP API Layer
//!
//! This crate provides the REST API for the fare engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Quote, service lookup and health endpoints
//! - **Middleware**: Tracing and request audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(quotes, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use domain_pricing::QuoteService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{health, pricing};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub quotes: QuoteService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `quotes` - Quote service wired to a pricing provider
/// * `config` - API configuration
pub fn create_router(quotes: QuoteService, config: ApiConfig) -> Router {
    let state = AppState { quotes, config };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let pricing_routes = Router::new()
        .route("/quote", post(pricing::create_quote))
        .route("/services/:code", get(pricing::get_service));

    let api_routes = Router::new()
        .nest("/pricing", pricing_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
