use crate::{DnsQuery, DomainError, RecordType};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Answers are short-lived so a rotation step is visible on the next lookup.
pub const DEFAULT_TTL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoaTiming {
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

impl SoaTiming {
    pub const REFRESH: u32 = 60 * 60;
    pub const RETRY: u32 = 60 * 60 * 3;
    pub const EXPIRE: u32 = 60 * 60 * 24;
    pub const MINIMUM: u32 = 60 * 60;

    pub fn defaults(serial: u32) -> Self {
        Self {
            serial,
            refresh: Self::REFRESH,
            retry: Self::RETRY,
            expire: Self::EXPIRE,
            minimum: Self::MINIMUM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
    TXT(String),
    NS(String),
    SOA {
        mname: String,
        rname: String,
        timing: SoaTiming,
    },
    MX {
        preference: u16,
        exchange: String,
    },
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::AAAA(_) => RecordType::AAAA,
            RecordData::CNAME(_) => RecordType::CNAME,
            RecordData::TXT(_) => RecordType::TXT,
            RecordData::NS(_) => RecordType::NS,
            RecordData::SOA { .. } => RecordType::SOA,
            RecordData::MX { .. } => RecordType::MX,
        }
    }

    /// Authority record from the primary name server and responsible mailbox,
    /// with the default refresh/retry/expire/minimum filled in.
    pub fn soa(mname: impl Into<String>, rname: impl Into<String>, serial: u32) -> Self {
        RecordData::SOA {
            mname: mname.into(),
            rname: rname.into(),
            timing: SoaTiming::defaults(serial),
        }
    }

    /// Parses `literal` as an address of the family `record_type` asks for.
    pub fn address(record_type: RecordType, literal: &str) -> Result<Self, DomainError> {
        let ip: IpAddr = literal
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidIpAddress(literal.to_string()))?;

        match (record_type, ip) {
            (RecordType::A, IpAddr::V4(v4)) => Ok(RecordData::A(v4)),
            (RecordType::AAAA, IpAddr::V6(v6)) => Ok(RecordData::AAAA(v6)),
            (RecordType::A, IpAddr::V6(_)) | (RecordType::AAAA, IpAddr::V4(_)) => {
                Err(DomainError::InvalidIpAddress(format!(
                    "{} does not match the {} family",
                    literal, record_type
                )))
            }
            (other, _) => Err(DomainError::InvalidRecordValue(format!(
                "{} is not an address record type",
                other
            ))),
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(ip) => write!(f, "{}", ip),
            RecordData::AAAA(ip) => write!(f, "{}", ip),
            RecordData::CNAME(name) | RecordData::NS(name) => write!(f, "{}", name),
            RecordData::TXT(text) => write!(f, "\"{}\"", text),
            RecordData::SOA {
                mname,
                rname,
                timing,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                mname,
                rname,
                timing.serial,
                timing.refresh,
                timing.retry,
                timing.expire,
                timing.minimum
            ),
            RecordData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
        }
    }
}

/// A resolved answer ready to be encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    data: RecordData,
    ttl: u32,
    owner: Option<Arc<str>>,
}

impl AnswerRecord {
    /// Uses [`DEFAULT_TTL`], except authority records which carry their
    /// negative-caching minimum.
    pub fn new(data: RecordData) -> Self {
        let ttl = match &data {
            RecordData::SOA { timing, .. } => timing.minimum,
            _ => DEFAULT_TTL,
        };
        Self {
            data,
            ttl,
            owner: None,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<Arc<str>>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    pub fn owner_or<'a>(&'a self, query_name: &'a str) -> &'a str {
        self.owner.as_deref().unwrap_or(query_name)
    }

    /// Yields the record only when the question asked for its type (or ANY).
    pub fn try_answer(&self, query: &DnsQuery) -> Option<&Self> {
        (query.record_type == RecordType::ANY || query.record_type == self.record_type())
            .then_some(self)
    }

    pub fn summary(&self) -> String {
        format!("{} {} ttl={}", self.record_type(), self.data, self.ttl)
    }
}
