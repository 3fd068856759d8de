//! HTTP API tests
//!
//! Drive the router in-process with `axum-test` over the seeded in-memory
//! catalogue, and over the mock provider for failure paths.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use domain_pricing::ports::mock::ops;
use domain_pricing::{QuoteConfig, QuoteService};
use infra_db::InMemoryPricingCatalog;
use interface_api::config::ApiConfig;
use interface_api::create_router;
use serde_json::{json, Value};
use test_utils::reference_provider;

fn server() -> TestServer {
    let quotes = QuoteService::new(Arc::new(InMemoryPricingCatalog::with_default_catalog()));
    TestServer::new(create_router(quotes, ApiConfig::default())).unwrap()
}

fn server_with(provider: domain_pricing::MockPricingPort, config: QuoteConfig) -> TestServer {
    let quotes = QuoteService::with_config(Arc::new(provider), config);
    TestServer::new(create_router(quotes, ApiConfig::default())).unwrap()
}

fn transfer_body() -> Value {
    json!({
        "serviceCode": "T004",
        "distanceKm": 10,
        "vehicleTypeId": "van_estandar",
        "segmentId": "B2C",
        "zoneId": "urbana",
        "scheduleId": "normal",
        "currencyCode": "CLP"
    })
}

mod quotes {
    use super::*;

    #[tokio::test]
    async fn test_transfer_quote() {
        let response = server().post("/api/v1/pricing/quote").json(&transfer_body()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["serviceCode"], "T004");
        assert_eq!(body["mode"], "transfer");
        assert_eq!(body["currency"], "CLP");
        assert_eq!(body["finalFare"], json!(42000.0));
        assert_eq!(body["commission"], json!(8400.0));
        assert_eq!(body["driverPayout"], json!(33600.0));
        assert_eq!(body["exchangeRate"], json!(1.0));
        assert_eq!(body["inputs"]["zoneId"], "urbana");
        assert_eq!(body["breakdown"]["minFareCLP"], json!(42000.0));
        assert!(body["quoteId"].is_string());
    }

    #[tokio::test]
    async fn test_surcharges_use_wire_names() {
        let mut body = transfer_body();
        body["paradas"] = json!(2);
        body["horasEspera"] = json!(1);

        let response = server().post("/api/v1/pricing/quote").json(&body).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["finalFare"], json!(64000.0));
        assert_eq!(body["inputs"]["paradas"], json!(2));
        assert_eq!(body["breakdown"]["stopsSurchargeCLP"], json!(6000.0));
        assert_eq!(body["breakdown"]["waitSurchargeCLP"], json!(16000.0));
    }

    #[tokio::test]
    async fn test_tour_quote_in_usd() {
        let response = server()
            .post("/api/v1/pricing/quote")
            .json(&json!({
                "serviceCode": "T014",
                "zoneId": "urbana",
                "scheduleId": "normal",
                "currencyCode": "USD"
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["mode"], "tour");
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["exchangeRate"], json!(950.0));
        let fare = body["finalFare"].as_f64().unwrap();
        assert!((fare - 368.42).abs() < 0.01);
        assert!(body["breakdown"].get("distanceKm").is_none());
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = server()
            .post("/api/v1/pricing/quote")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("trace-123"),
            )
            .json(&transfer_body())
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("x-request-id"), "trace-123");
    }
}

mod rejections {
    use super::*;

    async fn error_of(body: Value) -> (StatusCode, Value) {
        let response = server().post("/api/v1/pricing/quote").json(&body).await;
        (response.status_code(), response.json())
    }

    #[tokio::test]
    async fn test_unknown_service_is_bad_request() {
        let mut body = transfer_body();
        body["serviceCode"] = json!("T999");

        let (status, error) = error_of(body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "SERVICE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unknown_zone() {
        let mut body = transfer_body();
        body["zoneId"] = json!("lunar");

        let (status, error) = error_of(body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "INVALID_FACTORS");
    }

    #[tokio::test]
    async fn test_unknown_currency() {
        let mut body = transfer_body();
        body["currencyCode"] = json!("EUR");

        let (status, error) = error_of(body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "INVALID_CURRENCY");
    }

    #[tokio::test]
    async fn test_transfer_without_distance() {
        let mut body = transfer_body();
        body.as_object_mut().unwrap().remove("distanceKm");

        let (status, error) = error_of(body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_shape_validation_lists_fields() {
        let mut body = transfer_body();
        body["currencyCode"] = json!("DOLLARS");

        let (status, error) = error_of(body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "validation_error");
        assert!(error["details"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let response = server()
            .post("/api/v1/pricing/quote")
            .json(&json!({ "serviceCode": 42 }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_negative_stops_rejected() {
        let mut body = transfer_body();
        body["paradas"] = json!(-1);

        let (status, _) = error_of(body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_provider_outage_is_internal() {
        let server = server_with(reference_provider().failing(ops::GET_ZONE_FACTOR), QuoteConfig::default());

        let response = server.post("/api/v1/pricing/quote").json(&transfer_body()).await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: Value = response.json();
        assert_eq!(error["error"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out() {
        let server = server_with(
            reference_provider().delayed(ops::GET_SERVICE, Duration::from_millis(200)),
            QuoteConfig::default().with_lookup_timeout(Duration::from_millis(20)),
        );

        let response = server.post("/api/v1/pricing/quote").json(&transfer_body()).await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unsupported_mode_is_internal() {
        let mut charter = test_utils::ServiceFixtures::urban_transfer();
        charter.code = "C001".to_string();
        charter.mode = domain_pricing::ServiceMode::from("charter");
        let server = server_with(reference_provider().with_service(charter), QuoteConfig::default());

        let mut body = transfer_body();
        body["serviceCode"] = json!("C001");
        let response = server.post("/api/v1/pricing/quote").json(&body).await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: Value = response.json();
        assert_eq!(error["error"], "UNSUPPORTED_MODE");
    }
}

mod services {
    use super::*;

    #[tokio::test]
    async fn test_get_service() {
        let response = server().get("/api/v1/pricing/services/T014").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["code"], "T014");
        assert_eq!(body["mode"], "tour");
        assert_eq!(body["minFareCLP"], json!(350000.0));
        assert_eq!(body["baseFlatCLP"], json!(250000.0));
        assert_eq!(body["active"], true);
    }

    #[tokio::test]
    async fn test_unknown_service_is_not_found() {
        let response = server().get("/api/v1/pricing/services/T999").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let response = server().get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_with_catalogue() {
        let response = server().get("/health/ready").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["provider"], "in-memory-pricing-catalog");
    }

    #[tokio::test]
    async fn test_readiness_without_settings_is_degraded_but_ready() {
        let quotes = QuoteService::new(Arc::new(InMemoryPricingCatalog::empty()));
        let server = TestServer::new(create_router(quotes, ApiConfig::default())).unwrap();

        let response = server.get("/health/ready").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Pricing settings are not configured");
    }
}
