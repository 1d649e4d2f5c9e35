use async_trait::async_trait;
use rotor_dns_application::ports::StoredRecordRepository;
use rotor_dns_domain::{DomainError, RecordKey, RecordType, StoredRecord};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, instrument};

type StoredRecordRow = (i64, String, String, String, String, i64);

pub struct SqliteStoredRecordRepository {
    pool: SqlitePool,
}

impl SqliteStoredRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: StoredRecordRow) -> Result<StoredRecord, DomainError> {
        let (id, subdomain, domain, record_type, value, version) = row;
        let record_type = record_type
            .parse::<RecordType>()
            .map_err(DomainError::InvalidRecordValue)?;

        Ok(StoredRecord {
            id: Some(id),
            key: RecordKey::new(
                Arc::<str>::from(subdomain.as_str()),
                Arc::<str>::from(domain.as_str()),
                record_type,
            ),
            value,
            version,
        })
    }

    /// Creates the record or replaces its value, bumping the version either way.
    #[instrument(skip(self))]
    pub async fn upsert(&self, key: &RecordKey, value: &str) -> Result<StoredRecord, DomainError> {
        let row = sqlx::query_as::<_, StoredRecordRow>(
            "INSERT INTO dns_records (subdomain, domain, record_type, value)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (subdomain, domain, record_type) DO UPDATE SET
                value = excluded.value,
                version = dns_records.version + 1,
                updated_at = CURRENT_TIMESTAMP
             RETURNING id, subdomain, domain, record_type, value, version",
        )
        .bind(key.subdomain.as_ref())
        .bind(key.domain.as_ref())
        .bind(key.record_type.to_string())
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to upsert DNS record");
            DomainError::DatabaseError(e.to_string())
        })?;

        Self::row_to_record(row)
    }
}

#[async_trait]
impl StoredRecordRepository for SqliteStoredRecordRepository {
    #[instrument(skip(self))]
    async fn get_record(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<StoredRecord>, DomainError> {
        let row = sqlx::query_as::<_, StoredRecordRow>(
            "SELECT id, subdomain, domain, record_type, value, version
             FROM dns_records
             WHERE record_type = ?1
               AND (
                    (subdomain IN ('', '@') AND lower(domain) = ?2)
                 OR lower(subdomain) || '.' || lower(domain) = ?2
               )
             ORDER BY id
             LIMIT 1",
        )
        .bind(record_type.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch DNS record");
            DomainError::DatabaseError(e.to_string())
        })?;

        row.map(Self::row_to_record).transpose()
    }

    #[instrument(skip(self))]
    async fn update_record(
        &self,
        key: &RecordKey,
        expected_version: i64,
        new_value: &str,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE dns_records
             SET value = ?, version = version + 1, updated_at = CURRENT_TIMESTAMP
             WHERE subdomain = ? AND domain = ? AND record_type = ? AND version = ?",
        )
        .bind(new_value)
        .bind(key.subdomain.as_ref())
        .bind(key.domain.as_ref())
        .bind(key.record_type.to_string())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update DNS record");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }
}
