use async_trait::async_trait;
use rotor_dns_application::ports::AuditLogRepository;
use rotor_dns_domain::{AuditEntry, DomainError, RecordType};
use sqlx::SqlitePool;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, instrument};

type AuditRow = (i64, i64, String, String, String, String, String, Vec<u8>);

pub struct SqliteAuditLogRepository {
    pool: SqlitePool,
}

impl SqliteAuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: AuditRow) -> Result<AuditEntry, DomainError> {
        let (id, created_at, client_ip, query_type, query_name, subdomain, reply, raw) = row;
        let client_ip = client_ip
            .parse::<IpAddr>()
            .map_err(|_| DomainError::InvalidIpAddress(client_ip.clone()))?;

        Ok(AuditEntry {
            id: Some(id),
            timestamp: created_at,
            client_ip,
            query_type: query_type
                .parse::<RecordType>()
                .map_err(DomainError::InvalidRecordValue)?,
            query_name: Arc::from(query_name.as_str()),
            subdomain: Arc::from(subdomain.as_str()),
            reply_summary: reply,
            raw_query: Arc::from(raw),
        })
    }

    /// Newest entries first.
    #[instrument(skip(self))]
    pub async fn find_by_subdomain(
        &self,
        subdomain: &str,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, DomainError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT id, created_at, client_ip, query_type, query_name, subdomain, reply, raw
             FROM query_audit
             WHERE subdomain = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(subdomain)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch audit entries");
            DomainError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl AuditLogRepository for SqliteAuditLogRepository {
    #[instrument(skip(self, entry), fields(domain = %entry.query_name))]
    async fn insert(&self, entry: &AuditEntry) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO query_audit
                (created_at, client_ip, query_type, query_name, subdomain, reply, raw)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.timestamp)
        .bind(entry.client_ip.to_string())
        .bind(entry.query_type.to_string())
        .bind(entry.query_name.as_ref())
        .bind(entry.subdomain.as_ref())
        .bind(&entry.reply_summary)
        .bind(entry.raw_query.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert audit entry");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
