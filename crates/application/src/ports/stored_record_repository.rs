use async_trait::async_trait;
use rotor_dns_domain::{DomainError, RecordKey, RecordType, StoredRecord};

#[async_trait]
pub trait StoredRecordRepository: Send + Sync {
    /// Exact-name lookup; `name` is the fully-qualified query name.
    async fn get_record(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<StoredRecord>, DomainError>;

    /// Replaces the value only while the row still carries `expected_version`.
    ///
    /// Returns `Ok(false)` when another writer got there first.
    async fn update_record(
        &self,
        key: &RecordKey,
        expected_version: i64,
        new_value: &str,
    ) -> Result<bool, DomainError>;
}
