use async_trait::async_trait;
use rotor_dns_domain::{DnsQuery, DomainError};

#[async_trait]
pub trait SubdomainRepository: Send + Sync {
    /// Registered subdomain the query name belongs to, if any.
    async fn find_subdomain(&self, query: &DnsQuery) -> Result<Option<String>, DomainError>;
}
