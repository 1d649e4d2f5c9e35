use super::RecordType;
use std::sync::Arc;

/// Identifies one stored record: a (subdomain, domain, type) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub subdomain: Arc<str>,
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl RecordKey {
    pub fn new(
        subdomain: impl Into<Arc<str>>,
        domain: impl Into<Arc<str>>,
        record_type: RecordType,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            domain: domain.into(),
            record_type,
        }
    }

    /// An empty subdomain or `@` stands for the zone apex.
    pub fn is_apex(&self) -> bool {
        self.subdomain.is_empty() || self.subdomain.as_ref() == "@"
    }

    pub fn fqdn(&self) -> String {
        if self.is_apex() {
            self.domain.to_string()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }
}

/// Record configuration as persisted in the database.
///
/// `value` uses the rotation grammar (see [`crate::rotation`]). `version`
/// increases on every write and guards the rotation write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: Option<i64>,
    pub key: RecordKey,
    pub value: String,
    pub version: i64,
}

impl StoredRecord {
    pub fn new(key: RecordKey, value: impl Into<String>, version: i64) -> Self {
        Self {
            id: None,
            key,
            value: value.into(),
            version,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.key.record_type
    }
}
