mod audit_log_repository;
mod stored_record_repository;
mod subdomain_repository;

pub use audit_log_repository::AuditLogRepository;
pub use stored_record_repository::StoredRecordRepository;
pub use subdomain_repository::SubdomainRepository;

// Re-export for convenience
pub use rotor_dns_domain::DnsQuery;
