mod audit_log_service;

pub use audit_log_service::{redact_request_body, AuditLogService};
