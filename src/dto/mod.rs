pub mod audit_log_dto;
