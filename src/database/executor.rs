use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::Result;

/// A value bound to one stored-procedure parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Integer(Option<i64>),
    Timestamp(NaiveDateTime),
}

impl SqlParam {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlParam::Integer(None))
    }
}

/// One stored-procedure invocation with its parameters in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub procedure: String,
    pub params: Vec<(&'static str, SqlParam)>,
}

impl ProcedureCall {
    pub fn new(procedure: impl Into<String>) -> Self {
        Self {
            procedure: procedure.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, name: &'static str, value: SqlParam) -> Self {
        self.params.push((name, value));
        self
    }

    /// `EXEC Proc @A = @P1, @B = @P2, ...`. Null integers are written inline
    /// and take no placeholder.
    pub fn to_sql(&self) -> String {
        let mut placeholder = 0;
        let assignments = self
            .params
            .iter()
            .map(|(name, value)| {
                if value.is_null() {
                    format!("@{} = NULL", name)
                } else {
                    placeholder += 1;
                    format!("@{} = @P{}", name, placeholder)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        if assignments.is_empty() {
            format!("EXEC {}", self.procedure)
        } else {
            format!("EXEC {} {}", self.procedure, assignments)
        }
    }

    pub fn param(&self, name: &str) -> Option<&SqlParam> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value)
    }
}

/// Driver-neutral cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(String),
    Text(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Runs stored procedures against the audit database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcedureExecutor: Send + Sync {
    /// Runs a write procedure and commits it.
    async fn execute(&self, call: &ProcedureCall) -> Result<()>;
    /// Runs a read procedure and returns every result set it produced, in order.
    async fn query(&self, call: &ProcedureCall) -> Result<Vec<ResultSet>>;
    async fn server_version(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_names_each_parameter_positionally() {
        let call = ProcedureCall::new("USP_MES_InsertAuditLog")
            .bind("ActionCode", SqlParam::Text("LOGIN".into()))
            .bind("ModuleID", SqlParam::Integer(Some(4)));
        assert_eq!(
            call.to_sql(),
            "EXEC USP_MES_InsertAuditLog @ActionCode = @P1, @ModuleID = @P2"
        );
        assert_eq!(call.param("ModuleID"), Some(&SqlParam::Integer(Some(4))));
        assert_eq!(call.param("Euser"), None);
    }

    #[test]
    fn null_integer_is_inlined_without_a_placeholder() {
        let call = ProcedureCall::new("USP_MES_GetModuleAuditLog")
            .bind("ModuleID", SqlParam::Integer(None))
            .bind("Text", SqlParam::Text(String::new()));
        assert_eq!(
            call.to_sql(),
            "EXEC USP_MES_GetModuleAuditLog @ModuleID = NULL, @Text = @P1"
        );
    }

    #[test]
    fn call_without_parameters_is_a_bare_exec() {
        assert_eq!(ProcedureCall::new("USP_Ping").to_sql(), "EXEC USP_Ping");
    }
}
