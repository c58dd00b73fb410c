use axum::Json;
use utoipa::OpenApi;

use crate::dto::audit_log_dto::{
    AuthErrorResponse, ConnectionResponse, ErrorResponse, HealthResponse, MessageResponse,
    SearchResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::audit_log::insert_audit_log,
        crate::routes::audit_log::get_audit_logs,
        crate::routes::health::health,
        crate::routes::health::test_connection,
    ),
    components(schemas(
        SearchResponse,
        MessageResponse,
        HealthResponse,
        ConnectionResponse,
        ErrorResponse,
        AuthErrorResponse,
    )),
    tags((name = "auditlog", description = "Audit log ingestion and search"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
