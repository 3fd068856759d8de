//! PostgreSQL adapter integration tests
//!
//! These start a PostgreSQL container, so they are ignored by default. Run
//! them with `--ignored` on a machine with Docker.

use std::sync::Arc;

use core_kernel::{AdapterHealth, HealthCheckable, OperationMetadata};
use domain_pricing::{PricingError, PricingProviderPort, QuoteContext, QuoteService, ServiceMode};
use infra_db::PostgresPricingAdapter;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::{
    assert_clp_quote, create_isolated_test_database, get_shared_test_database,
    TourRequestBuilder, TransferRequestBuilder,
};

async fn adapter() -> PostgresPricingAdapter {
    let db = get_shared_test_database().await;
    PostgresPricingAdapter::new(db.pool().clone())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_seeded_catalogue_is_readable() {
    let adapter = adapter().await;

    let settings = adapter.get_settings().await.unwrap();
    assert_eq!(settings.base_per_km_clp, dec!(1200));
    assert_eq!(settings.commission_rate.as_decimal(), dec!(0.2));
    assert!(settings.default_currency.is_base());

    let service = adapter.get_service_by_code("T014").await.unwrap();
    assert_eq!(service.mode, ServiceMode::Tour);
    assert_eq!(service.min_fare_clp, dec!(350000));

    assert_eq!(adapter.get_vehicle_factor("bus_premium").await.unwrap(), dec!(2.5));
    assert_eq!(adapter.get_segment_factor("B2B").await.unwrap(), dec!(0.9));
    assert_eq!(adapter.get_zone_factor("interregional").await.unwrap(), dec!(1.3));
    assert_eq!(adapter.get_currency_rate("USD").await.unwrap(), dec!(950));
    assert_eq!(adapter.get_currency_rate("CLP").await.unwrap(), Decimal::ONE);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_missing_rows_are_not_found() {
    let adapter = adapter().await;

    assert!(adapter.get_service_by_code("T999").await.unwrap_err().is_not_found());
    assert!(adapter.get_zone_factor("lunar").await.unwrap_err().is_not_found());
    assert!(adapter.get_currency_rate("EUR").await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_schedule_override_precedes_generic_factor() {
    let adapter = adapter().await;

    assert_eq!(
        adapter.get_schedule_factor_for_service("punta", "T015").await.unwrap(),
        dec!(1.2)
    );
    assert_eq!(
        adapter.get_schedule_factor_for_service("punta", "T014").await.unwrap(),
        dec!(1.3)
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_quote_flow_writes_audit_row() {
    let db = create_isolated_test_database().await.unwrap();
    let adapter = Arc::new(PostgresPricingAdapter::new(db.pool().clone()));
    let quotes = QuoteService::new(adapter);
    let ctx = QuoteContext::new().with_metadata(OperationMetadata::with_correlation_id("pg-1"));

    let result = quotes
        .calculate_price(&ctx, &TransferRequestBuilder::new().build())
        .await
        .unwrap();
    assert_clp_quote(&result, dec!(42000), dec!(8400), dec!(33600));

    let tour = quotes
        .calculate_price(&ctx, &TourRequestBuilder::new().service("T015").schedule("punta").build())
        .await
        .unwrap();
    assert_eq!(tour.final_fare, dec!(300000));

    assert_eq!(db.audit_count().await.unwrap(), 2);
    let correlation: Option<String> = sqlx::query_scalar(
        "SELECT correlation_id FROM pricing_quote_audit WHERE quote_id = $1",
    )
    .bind(*result.quote_id.as_uuid())
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(correlation.as_deref(), Some("pg-1"));

    db.clear_data().await.unwrap();
    assert_eq!(db.audit_count().await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_inactive_service_hidden() {
    let db = create_isolated_test_database().await.unwrap();
    sqlx::query("UPDATE pricing_services SET is_active = FALSE WHERE code = 'T003'")
        .execute(db.pool())
        .await
        .unwrap();
    let quotes = QuoteService::new(Arc::new(PostgresPricingAdapter::new(db.pool().clone())));

    let err = quotes
        .calculate_price(&QuoteContext::new(), &TransferRequestBuilder::new().service("T003").build())
        .await
        .unwrap_err();

    assert_eq!(err, PricingError::ServiceNotFound("T003".to_string()));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check_round_trips() {
    let health = adapter().await.health_check().await;
    assert_eq!(health.status, AdapterHealth::Healthy);
    assert!(health.message.is_none());
}
