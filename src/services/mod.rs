pub mod audit_log_service;
pub mod binder;
pub mod normalizer;
pub mod projector;
