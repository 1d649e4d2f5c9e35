use async_trait::async_trait;
use rotor_dns_domain::{AuditEntry, DomainError};

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn insert(&self, entry: &AuditEntry) -> Result<(), DomainError>;
}
