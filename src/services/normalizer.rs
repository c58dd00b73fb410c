//! Turns raw request input into schema-ordered values and validates them,
//! stopping at the first field that fails.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::models::audit_log::{Fallback, InsertSchema, SearchParam, SearchSchema};

pub type Payload = Map<String, JsonValue>;

pub fn insert_payload(body: &[u8]) -> Result<Payload> {
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => Ok(map),
        _ => Err(Error::MalformedRequest("Invalid JSON payload".to_string())),
    }
}

pub fn validate_insert(schema: &InsertSchema, payload: &Payload) -> Result<()> {
    for rule in schema.required {
        let Some(value) = payload.get(rule.name) else {
            return Err(Error::Validation(format!(
                "Missing required field: {}",
                rule.name
            )));
        };
        rule.check(value).map_err(Error::Validation)?;
    }

    for rule in schema.optional {
        match payload.get(rule.name) {
            None | Some(JsonValue::Null) => {}
            Some(value) => rule.check(value).map_err(Error::Validation)?,
        }
    }
    Ok(())
}

/// Search parameters in procedure order. `None` means unset: the binder
/// supplies NULL or a computed date for it.
#[derive(Debug, Clone)]
pub struct SearchParams {
    entries: Vec<(&'static SearchParam, Option<String>)>,
}

impl SearchParams {
    pub fn from_query(schema: &'static SearchSchema, query: &HashMap<String, String>) -> Self {
        let entries = schema
            .params
            .iter()
            .map(|param| {
                let raw = query.get(param.rule.name).cloned();
                let value = match (raw, param.fallback) {
                    (Some(v), Fallback::Value(_)) => Some(v),
                    (None, Fallback::Value(default)) => Some(default.to_string()),
                    (Some(v), _) if !v.is_empty() => Some(v),
                    _ => None,
                };
                (param, value)
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static SearchParam, Option<&str>)> + '_ {
        self.entries
            .iter()
            .map(|(param, value)| (*param, value.as_deref()))
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries()
            .find(|(param, _)| param.rule.name == name)
            .and_then(|(_, value)| value)
    }

    pub fn validate(&self) -> Result<()> {
        for (param, value) in self.entries() {
            if let Some(value) = value {
                param
                    .rule
                    .check(&JsonValue::String(value.to_string()))
                    .map_err(Error::Validation)?;
            }
        }
        Ok(())
    }

    /// Name/value view used for request logging.
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .entries()
            .map(|(param, value)| {
                let value = value.map_or(JsonValue::Null, |v| JsonValue::String(v.to_string()));
                (param.rule.name.to_string(), value)
            })
            .collect::<Map<_, _>>();
        JsonValue::Object(map)
    }
}
