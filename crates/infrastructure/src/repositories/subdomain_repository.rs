use async_trait::async_trait;
use rotor_dns_application::ports::SubdomainRepository;
use rotor_dns_domain::{DnsQuery, DomainError};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, instrument};

/// Subdomains registered directly beneath the served zone.
pub struct SqliteSubdomainRepository {
    pool: SqlitePool,
    zone: Arc<str>,
}

impl SqliteSubdomainRepository {
    pub fn new(pool: SqlitePool, zone: Arc<str>) -> Self {
        Self { pool, zone }
    }

    #[instrument(skip(self))]
    pub async fn register(&self, name: &str) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO subdomains (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(name.to_ascii_lowercase())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to register subdomain");
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }
}

#[async_trait]
impl SubdomainRepository for SqliteSubdomainRepository {
    #[instrument(skip(self))]
    async fn find_subdomain(&self, query: &DnsQuery) -> Result<Option<String>, DomainError> {
        let Some(label) = query.label_under(&self.zone) else {
            return Ok(None);
        };

        sqlx::query_scalar::<_, String>("SELECT name FROM subdomains WHERE name = ? LIMIT 1")
            .bind(label)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to look up subdomain");
                DomainError::DatabaseError(e.to_string())
            })
    }
}
