pub mod audit_query;

pub use audit_query::AuditQueryUseCase;
