pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::Level;

use crate::database::ProcedureExecutor;
use crate::middleware::auth::{require_bearer_auth, JwtAuth};
use crate::models::audit_log::SchemaVariant;
use crate::services::audit_log_service::AuditLogService;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn ProcedureExecutor>,
    pub audit_log_service: AuditLogService,
}

impl AppState {
    pub fn new(executor: Arc<dyn ProcedureExecutor>, variant: SchemaVariant) -> Self {
        let audit_log_service = AuditLogService::new(executor.clone(), variant.schema());
        Self {
            executor,
            audit_log_service,
        }
    }
}

/// Largest accepted request body. A `Changes` value at its 1,000,000 character
/// limit can take six bytes per character once JSON-escaped, plus the other
/// fields.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Full HTTP surface. Bearer auth wraps every route when `auth` is given.
pub fn build_router(state: AppState, auth: Option<JwtAuth>) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/test-connection", get(routes::health::test_connection))
        .route(
            "/auditlog",
            get(routes::audit_log::get_audit_logs).post(routes::audit_log::insert_audit_log),
        )
        .route("/api-docs/openapi.json", get(routes::docs::openapi_json))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    if let Some(auth) = auth {
        app = app.layer(axum::middleware::from_fn_with_state(
            Arc::new(auth),
            require_bearer_auth,
        ));
    }

    app.layer(CorsLayer::permissive())
        // Handlers log their own failures at error level.
        .layer(
            TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)),
        )
}
