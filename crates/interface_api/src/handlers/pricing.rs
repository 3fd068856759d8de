//! Pricing handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use core_kernel::OperationMetadata;
use domain_pricing::{PricingError, PricingRequest, QuoteContext};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::pricing::{QuoteRequestDto, QuoteResponse, ServiceResponse};
use crate::middleware::RequestId;
use crate::{error::ApiError, AppState};

fn context(state: &AppState, request_id: Option<Extension<RequestId>>) -> QuoteContext {
    let metadata = match request_id {
        Some(Extension(RequestId(id))) => OperationMetadata::with_correlation_id(id),
        None => OperationMetadata::default(),
    };
    QuoteContext::new()
        .with_timeout(state.config.quote_timeout())
        .with_metadata(metadata)
}

/// Prices a trip
#[instrument(skip_all)]
pub async fn create_quote(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<QuoteRequestDto>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let Json(dto) = payload?;
    dto.validate()?;
    let request = PricingRequest::try_from(dto)?;

    let ctx = context(&state, request_id);
    let result = state.quotes.calculate_price(&ctx, &request).await?;

    info!(quote_id = %result.quote_id, final_fare = %result.final_fare, "Quote served");
    Ok(Json(result.into()))
}

/// Gets an active service by code
pub async fn get_service(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Path(code): Path<String>,
) -> Result<Json<ServiceResponse>, ApiError> {
    let ctx = context(&state, request_id);
    match state.quotes.get_service(&ctx, &code).await {
        Ok(service) => Ok(Json(service.into())),
        Err(PricingError::ServiceNotFound(code)) => {
            Err(ApiError::NotFound(format!("Service {} not found", code)))
        }
        Err(e) => Err(e.into()),
    }
}
