use crate::ports::{AuditLogRepository, SubdomainRepository};
use rotor_dns_domain::{AuditEntry, DnsRequest, DomainError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Records served answers for queries under a registered subdomain.
pub struct AuditQueryUseCase {
    audit_log: Arc<dyn AuditLogRepository>,
    subdomains: Arc<dyn SubdomainRepository>,
    enabled: bool,
}

impl AuditQueryUseCase {
    pub fn new(
        audit_log: Arc<dyn AuditLogRepository>,
        subdomains: Arc<dyn SubdomainRepository>,
    ) -> Self {
        Self {
            audit_log,
            subdomains,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Writes one entry and returns it, or `None` when the query does not
    /// belong to a registered subdomain.
    pub async fn execute(
        &self,
        request: &DnsRequest,
        reply_summary: &str,
    ) -> Result<Option<AuditEntry>, DomainError> {
        if !self.enabled {
            return Ok(None);
        }

        let Some(subdomain) = self.subdomains.find_subdomain(&request.query).await? else {
            debug!(domain = %request.domain(), "No registered subdomain, skipping audit");
            return Ok(None);
        };

        let entry = AuditEntry {
            id: None,
            timestamp: chrono::Utc::now().timestamp(),
            client_ip: request.client_ip,
            query_type: request.record_type(),
            query_name: Arc::clone(&request.query.domain),
            subdomain: Arc::from(subdomain.as_str()),
            reply_summary: reply_summary.to_string(),
            raw_query: Arc::clone(&request.raw_query),
        };

        self.audit_log.insert(&entry).await?;
        Ok(Some(entry))
    }

    /// Fire-and-forget variant; failures are logged and never reach the caller.
    pub fn spawn(self: &Arc<Self>, request: DnsRequest, reply_summary: String) {
        if !self.enabled {
            return;
        }

        let auditor = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = auditor.execute(&request, &reply_summary).await {
                warn!(
                    error = %e,
                    domain = %request.domain(),
                    client = %request.client_ip,
                    "Failed to audit query"
                );
            }
        });
    }
}
