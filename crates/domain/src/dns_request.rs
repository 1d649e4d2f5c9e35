use super::{DnsQuery, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

/// One incoming question together with where it came from.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    pub query: DnsQuery,
    pub client_ip: IpAddr,
    pub raw_query: Arc<[u8]>,
}

impl DnsRequest {
    pub fn new(
        domain: impl AsRef<str>,
        record_type: RecordType,
        client_ip: IpAddr,
        raw_query: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            query: DnsQuery::new(domain, record_type),
            client_ip,
            raw_query: raw_query.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.query.domain
    }

    pub fn record_type(&self) -> RecordType {
        self.query.record_type
    }
}
