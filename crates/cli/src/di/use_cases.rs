use super::Repositories;
use rotor_dns_application::use_cases::{
    AuditQueryUseCase, HandleDnsQueryUseCase, ResolveQueryUseCase,
};
use rotor_dns_domain::{Config, ZoneDefaults};
use std::sync::Arc;
use tracing::info;

pub struct UseCases {
    pub handle_query: Arc<HandleDnsQueryUseCase>,
}

impl UseCases {
    pub fn new(config: &Config, repos: &Repositories, zone: Arc<ZoneDefaults>) -> Self {
        let resolver = ResolveQueryUseCase::new(repos.records.clone(), zone)
            .with_ttl(config.dns.answer_ttl)
            .with_max_attempts(config.dns.rotation_max_retries);

        let auditor = AuditQueryUseCase::new(repos.audit_log.clone(), repos.subdomains.clone())
            .with_enabled(config.database.audit_queries);
        if !auditor.is_enabled() {
            info!("Query auditing disabled");
        }

        let handle_query =
            HandleDnsQueryUseCase::new(Arc::new(resolver)).with_auditor(Arc::new(auditor));

        Self {
            handle_query: Arc::new(handle_query),
        }
    }
}
