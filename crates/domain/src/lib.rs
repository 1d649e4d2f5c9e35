//! Rotor DNS Domain Layer
pub mod answer;
pub mod audit;
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod dns_request;
pub mod errors;
pub mod rotation;
pub mod stored_record;
pub mod zone;

pub use answer::{AnswerRecord, RecordData, SoaTiming, DEFAULT_TTL};
pub use audit::AuditEntry;
pub use config::{CliOverrides, Config, ConfigError};
pub use dns_query::DnsQuery;
pub use dns_record::RecordType;
pub use dns_request::DnsRequest;
pub use errors::DomainError;
pub use rotation::{RotationGroup, RotationPlan, RotationPolicy, RoundRobinList};
pub use stored_record::{RecordKey, StoredRecord};
pub use zone::ZoneDefaults;
