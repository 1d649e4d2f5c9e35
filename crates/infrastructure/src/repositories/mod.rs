pub mod audit_log_repository;
pub mod stored_record_repository;
pub mod subdomain_repository;

pub use audit_log_repository::SqliteAuditLogRepository;
pub use stored_record_repository::SqliteStoredRecordRepository;
pub use subdomain_repository::SqliteSubdomainRepository;
