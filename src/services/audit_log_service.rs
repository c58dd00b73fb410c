use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::database::ProcedureExecutor;
use crate::dto::audit_log_dto::SearchResponse;
use crate::error::{Error, Result};
use crate::models::audit_log::AuditSchema;
use crate::services::normalizer::{self, SearchParams};
use crate::services::{binder, projector};
use crate::utils::time;

/// Validate, bind, invoke and project for one entry variant.
#[derive(Clone)]
pub struct AuditLogService {
    executor: Arc<dyn ProcedureExecutor>,
    schema: &'static AuditSchema,
}

impl AuditLogService {
    pub fn new(executor: Arc<dyn ProcedureExecutor>, schema: &'static AuditSchema) -> Self {
        Self { executor, schema }
    }

    pub async fn insert(&self, body: &[u8]) -> Result<()> {
        let payload = normalizer::insert_payload(body)?;
        tracing::info!(
            "Received POST payload: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        );

        normalizer::validate_insert(&self.schema.insert, &payload)?;
        let call = binder::bind_insert(&self.schema.insert, &payload);

        self.executor
            .execute(&call)
            .await
            .map_err(|e| upstream("insert_audit_log", e))
    }

    pub async fn search(&self, query: &HashMap<String, String>) -> Result<SearchResponse> {
        self.search_at(query, time::now()).await
    }

    /// Same as [`search`](Self::search) with an explicit clock for the default date range.
    pub async fn search_at(
        &self,
        query: &HashMap<String, String>,
        now: NaiveDateTime,
    ) -> Result<SearchResponse> {
        let schema = &self.schema.search;
        let params = SearchParams::from_query(schema, query);
        tracing::info!("Received GET params: {}", params.to_json());

        params.validate()?;
        let bound = binder::bind_search(schema, &params, now)?;

        let sets = self
            .executor
            .query(&bound.call)
            .await
            .map_err(|e| upstream("get_audit_logs", e))?;

        let data = sets.first().map(projector::project_rows).unwrap_or_default();
        let total_count = projector::total_count(&sets, schema.count_fallback, data.len());

        Ok(SearchResponse {
            data,
            total_count,
            page_number: bound.page_number,
            page_size: bound.page_size,
        })
    }
}

fn upstream(operation: &str, err: Error) -> Error {
    tracing::error!("Error in {}: {}", operation, err.message());
    err
}
