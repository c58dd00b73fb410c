pub mod audit_log;
pub mod docs;
pub mod health;
