use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::audit_log_dto::MessageResponse,
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/auditlog",
    request_body(content = String, content_type = "application/json", description = "Audit log entry for the deployed schema variant"),
    responses(
        (status = 201, description = "Audit log inserted", body = MessageResponse),
        (status = 400, description = "Invalid payload or field", body = crate::dto::audit_log_dto::ErrorResponse),
        (status = 500, description = "Database failure", body = crate::dto::audit_log_dto::ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn insert_audit_log(
    State(state): State<AppState>,
    caller: Option<Extension<AuthenticatedUser>>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    if let Some(Extension(user)) = &caller {
        tracing::debug!("Audit log insert requested by {}", user.email);
    }
    state.audit_log_service.insert(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Audit log inserted successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/auditlog",
    params(
        ("SearchString" = Option<String>, Query, description = "Free-text filter (variant A)"),
        ("Text" = Option<String>, Query, description = "Free-text filter (variant B)"),
        ("FromDate" = Option<String>, Query, description = "YYYY-MM-DD HH:MM:SS, defaults to January 1 of the current year"),
        ("ToDate" = Option<String>, Query, description = "YYYY-MM-DD HH:MM:SS, defaults to now"),
        ("PageNumber" = Option<i64>, Query, description = "Page number, at least 1"),
        ("PageSize" = Option<i64>, Query, description = "Items per page, at least 1"),
        ("ModuleID" = Option<i64>, Query, description = "Module filter (variant B)"),
        ("Euser" = Option<String>, Query, description = "Acting user filter"),
        ("CaseID" = Option<String>, Query, description = "Case filter"),
        ("Operation" = Option<String>, Query, description = "Operation filter")
    ),
    responses(
        (status = 200, description = "Page of audit log entries", body = crate::dto::audit_log_dto::SearchResponse),
        (status = 400, description = "Invalid query parameter", body = crate::dto::audit_log_dto::ErrorResponse),
        (status = 500, description = "Database failure", body = crate::dto::audit_log_dto::ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_audit_logs(
    State(state): State<AppState>,
    query: std::result::Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(params) = query.map_err(|e| Error::Validation(e.body_text()))?;
    let result = state.audit_log_service.search(&params).await?;
    Ok(Json(result))
}
