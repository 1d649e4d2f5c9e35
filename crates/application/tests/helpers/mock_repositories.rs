#![allow(dead_code)]

use async_trait::async_trait;
use rotor_dns_application::ports::{
    AuditLogRepository, StoredRecordRepository, SubdomainRepository,
};
use rotor_dns_domain::{
    AuditEntry, DnsQuery, DomainError, RecordKey, RecordType, StoredRecord, ZoneDefaults,
};
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub fn zone() -> Arc<ZoneDefaults> {
    Arc::new(ZoneDefaults {
        server_ip: Ipv4Addr::new(203, 0, 113, 10),
        server_ipv6: None,
        server_domain: Arc::from("rotor.example"),
        default_txt: Arc::from("Hello!"),
        soa_mname: Arc::from("ns1.rotor.example"),
        soa_rname: Arc::from("hostmaster.rotor.example"),
        serial: 1_700_000_000,
    })
}

#[derive(Clone, Default)]
pub struct MockStoredRecordRepository {
    records: Arc<RwLock<HashMap<(String, RecordType), StoredRecord>>>,
    conflicts: Arc<AtomicU32>,
    fail_reads: Arc<AtomicBool>,
    reads: Arc<AtomicU32>,
    fail_reads_from: Arc<AtomicU32>,
    fail_writes: Arc<AtomicBool>,
    updates: Arc<AtomicU32>,
}

impl MockStoredRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, subdomain: &str, domain: &str, record_type: RecordType, value: &str) {
        let key = RecordKey::new(subdomain, domain, record_type);
        let fqdn = key.fqdn();
        self.records
            .write()
            .await
            .insert((fqdn, record_type), StoredRecord::new(key, value, 1));
    }

    pub async fn value_of(&self, name: &str, record_type: RecordType) -> Option<String> {
        self.records
            .read()
            .await
            .get(&(name.to_string(), record_type))
            .map(|r| r.value.clone())
    }

    /// The next `n` conditional updates lose to a simulated concurrent writer
    /// that persists the same step first.
    pub fn inject_conflicts(&self, n: u32) {
        self.conflicts.store(n, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Reads numbered `n` and later fail; earlier ones succeed.
    pub fn fail_reads_from(&self, n: u32) {
        self.fail_reads_from.store(n, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn update_count(&self) -> u32 {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoredRecordRepository for MockStoredRecordRepository {
    async fn get_record(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<StoredRecord>, DomainError> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_from = self.fail_reads_from.load(Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) || (fail_from > 0 && read >= fail_from) {
            return Err(DomainError::DatabaseError("read failed".to_string()));
        }
        Ok(self
            .records
            .read()
            .await
            .get(&(name.to_string(), record_type))
            .cloned())
    }

    async fn update_record(
        &self,
        key: &RecordKey,
        expected_version: i64,
        new_value: &str,
    ) -> Result<bool, DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("write failed".to_string()));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&(key.fqdn(), key.record_type)) else {
            return Ok(false);
        };

        if self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            record.value = new_value.to_string();
            record.version += 1;
            return Ok(false);
        }

        if record.version != expected_version {
            return Ok(false);
        }
        record.value = new_value.to_string();
        record.version += 1;
        Ok(true)
    }
}

#[derive(Clone, Default)]
pub struct MockAuditLogRepository {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
    should_fail: Arc<AtomicBool>,
}

impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn insert(&self, entry: &AuditEntry) -> Result<(), DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("audit insert failed".to_string()));
        }
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockSubdomainRepository {
    zone: Arc<str>,
    registered: Arc<RwLock<HashSet<String>>>,
}

impl MockSubdomainRepository {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: Arc::from(zone),
            registered: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub async fn register(&self, name: &str) {
        self.registered.write().await.insert(name.to_string());
    }
}

#[async_trait]
impl SubdomainRepository for MockSubdomainRepository {
    async fn find_subdomain(&self, query: &DnsQuery) -> Result<Option<String>, DomainError> {
        let Some(label) = query.label_under(&self.zone) else {
            return Ok(None);
        };
        let registered = self.registered.read().await;
        Ok(registered.contains(label).then(|| label.to_string()))
    }
}
