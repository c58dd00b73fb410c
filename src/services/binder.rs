//! Positional parameter binding for the insert and search procedures.

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::database::{ProcedureCall, SqlParam};
use crate::error::{Error, Result};
use crate::models::audit_log::{Fallback, FieldKind, InsertSchema, SearchSchema};
use crate::services::normalizer::{Payload, SearchParams};
use crate::utils::time::{parse_timestamp, start_of_year};
use crate::utils::validation::parse_integer;

/// Absent or null optional fields bind as empty text.
pub fn bind_insert(schema: &InsertSchema, payload: &Payload) -> ProcedureCall {
    schema
        .bind_order
        .iter()
        .fold(ProcedureCall::new(schema.procedure), |call, name| {
            let value = payload.get(*name).filter(|v| !v.is_null());
            let integer = matches!(
                schema.rule(name).map(|rule| rule.kind),
                Some(FieldKind::Integer { .. })
            );
            let param = match value {
                Some(v) if integer => SqlParam::Integer(parse_integer(v)),
                Some(v) => SqlParam::Text(text_of(v)),
                None if integer => SqlParam::Integer(None),
                None => SqlParam::Text(String::new()),
            };
            call.bind(*name, param)
        })
}

fn text_of(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundSearch {
    pub call: ProcedureCall,
    pub page_number: i64,
    pub page_size: i64,
}

/// Binds validated search parameters; `now` anchors the default date range.
pub fn bind_search(
    schema: &SearchSchema,
    params: &SearchParams,
    now: NaiveDateTime,
) -> Result<BoundSearch> {
    let mut call = ProcedureCall::new(schema.procedure);
    for (param, value) in params.entries() {
        let name = param.rule.name;
        let bound = match param.rule.kind {
            FieldKind::Text { .. } => SqlParam::Text(value.unwrap_or_default().to_string()),
            FieldKind::Integer { .. } => SqlParam::Integer(value.map(|v| integer(name, v)).transpose()?),
            FieldKind::Timestamp => SqlParam::Timestamp(match value {
                Some(v) => parse_timestamp(v).ok_or_else(|| {
                    Error::Validation("Invalid date format. Use YYYY-MM-DD HH:MM:SS".to_string())
                })?,
                None if param.fallback == Fallback::StartOfYear => start_of_year(now),
                None => now,
            }),
        };
        call = call.bind(name, bound);
    }

    let page = |name: &str| match call.param(name) {
        Some(SqlParam::Integer(Some(n))) => *n,
        _ => 0,
    };
    let page_number = page(schema.page_number);
    let page_size = page(schema.page_size);

    Ok(BoundSearch {
        call,
        page_number,
        page_size,
    })
}

fn integer(name: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation(format!("{} must be a valid integer", name)))
}
