use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    dto::audit_log_dto::{ConnectionResponse, HealthResponse},
    error::{Error, Result},
    utils::time::{format_timestamp, now},
    AppState,
};

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = HealthResponse {
        status: "healthy".to_string(),
        timestamp: format_timestamp(&now()),
    };
    (StatusCode::OK, Json(body))
}

#[utoipa::path(
    get,
    path = "/test-connection",
    responses(
        (status = 200, description = "Database reachable", body = ConnectionResponse),
        (status = 500, description = "Database unreachable", body = crate::dto::audit_log_dto::ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn test_connection(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let version = state.executor.server_version().await.map_err(|e| {
        tracing::error!("Connection test failed: {}", e.message());
        Error::Upstream(format!("Connection failed: {}", e.message()))
    })?;
    Ok((
        StatusCode::OK,
        Json(ConnectionResponse {
            message: "Connection successful".to_string(),
            version,
        }),
    ))
}
