use crate::dtos::NamesRequest;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;
use validator::Validate;

/// `POST /api/names`: forward the pattern image to the naming provider and
/// return the suggested names as a bare JSON array.
///
/// Every provider failure — non-2xx upstream status, timeout, or a response
/// that violates the output contract — maps to the same generic 502. Upstream
/// detail is logged server-side and never reaches the client.
pub async fn suggest_names(
    State(state): State<AppState>,
    Json(request): Json<NamesRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let names = state
        .provider
        .suggest_names(&request.image_data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Naming provider call failed");
            AppError::BadGateway("naming provider request failed".to_string())
        })?;

    tracing::info!(count = names.len(), "Returning name suggestions");

    Ok(Json(names))
}
