pub mod executor;
pub mod mssql;

pub use executor::{ProcedureCall, ProcedureExecutor, ResultSet, SqlParam, SqlValue};
pub use mssql::MssqlExecutor;
