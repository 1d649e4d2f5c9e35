use super::resolve_query::{Resolution, ResolveQueryUseCase};
use crate::use_cases::audit::AuditQueryUseCase;
use rotor_dns_domain::DnsRequest;
use std::sync::Arc;

/// Resolves a request and hands the outcome to the auditor.
pub struct HandleDnsQueryUseCase {
    resolver: Arc<ResolveQueryUseCase>,
    auditor: Option<Arc<AuditQueryUseCase>>,
}

impl HandleDnsQueryUseCase {
    pub fn new(resolver: Arc<ResolveQueryUseCase>) -> Self {
        Self {
            resolver,
            auditor: None,
        }
    }

    pub fn with_auditor(mut self, auditor: Arc<AuditQueryUseCase>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    pub async fn execute(&self, request: &DnsRequest) -> Resolution {
        let resolution = self.resolver.execute(&request.query).await;

        // Audit runs detached so the reply is not held up by the write.
        // Handled queries that produced no answer are logged with an empty reply.
        if let Some(auditor) = self.auditor.as_ref().filter(|_| resolution.handled) {
            let reply = resolution
                .answer
                .as_ref()
                .map(|answer| answer.summary())
                .unwrap_or_default();
            auditor.spawn(request.clone(), reply);
        }

        resolution
    }
}
