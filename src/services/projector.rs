use serde_json::{Map, Number, Value as JsonValue};

use crate::database::{ResultSet, SqlValue};
use crate::models::audit_log::CountFallback;
use crate::utils::time::format_timestamp;

pub type Record = Map<String, JsonValue>;

/// One record per row, keys in column order.
pub fn project_rows(set: &ResultSet) -> Vec<Record> {
    set.rows
        .iter()
        .map(|row| {
            set.columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.clone(), project_value(value)))
                .collect::<Record>()
        })
        .collect()
}

pub fn project_value(value: &SqlValue) -> JsonValue {
    match value {
        SqlValue::Null => JsonValue::Null,
        SqlValue::Bool(b) => JsonValue::Bool(*b),
        SqlValue::Int(n) => JsonValue::from(*n),
        SqlValue::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        SqlValue::Decimal(d) | SqlValue::Text(d) => JsonValue::String(d.clone()),
        SqlValue::Timestamp(ts) => JsonValue::String(format_timestamp(ts)),
        SqlValue::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
        SqlValue::Time(t) => JsonValue::String(t.format("%H:%M:%S").to_string()),
        SqlValue::Bytes(b) => JsonValue::from(b.clone()),
    }
}

/// Reads the single-cell count from the secondary result set, falling back
/// per variant when the procedure did not produce one.
pub fn total_count(sets: &[ResultSet], fallback: CountFallback, projected: usize) -> i64 {
    let counted = sets
        .get(1)
        .and_then(|set| set.rows.first())
        .and_then(|row| row.first())
        .and_then(|cell| match cell {
            SqlValue::Int(n) => Some(*n),
            SqlValue::Float(f) => Some(*f as i64),
            SqlValue::Decimal(d) | SqlValue::Text(d) => d.trim().parse().ok(),
            _ => None,
        });
    counted.unwrap_or(match fallback {
        CountFallback::RowCount => projected as i64,
        CountFallback::Zero => 0,
    })
}
