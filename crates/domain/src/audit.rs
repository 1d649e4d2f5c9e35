use crate::RecordType;
use std::net::IpAddr;
use std::sync::Arc;

/// One served answer, written once to the audit log and never updated.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Option<i64>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub client_ip: IpAddr,
    pub query_type: RecordType,
    pub query_name: Arc<str>,
    pub subdomain: Arc<str>,
    pub reply_summary: String,
    pub raw_query: Arc<[u8]>,
}
