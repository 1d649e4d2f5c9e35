//! Mapping between `rotor_dns_domain::RecordType` and `hickory_proto::rr::RecordType`.
//!
//! Both sides agree on the numeric codes, so anything the domain carries as
//! `Other(code)` survives the round trip unchanged.

use hickory_proto::rr::RecordType as HickoryRecordType;
use rotor_dns_domain::RecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::CNAME => HickoryRecordType::CNAME,
            RecordType::MX => HickoryRecordType::MX,
            RecordType::TXT => HickoryRecordType::TXT,
            RecordType::NS => HickoryRecordType::NS,
            RecordType::SOA => HickoryRecordType::SOA,
            RecordType::ANY => HickoryRecordType::ANY,
            RecordType::Other(code) => HickoryRecordType::from(code),
        }
    }

    /// Every wire type maps to something; unknown codes become `Other`.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> RecordType {
        match hickory_type {
            HickoryRecordType::A => RecordType::A,
            HickoryRecordType::AAAA => RecordType::AAAA,
            HickoryRecordType::CNAME => RecordType::CNAME,
            HickoryRecordType::MX => RecordType::MX,
            HickoryRecordType::TXT => RecordType::TXT,
            HickoryRecordType::NS => RecordType::NS,
            HickoryRecordType::SOA => RecordType::SOA,
            HickoryRecordType::ANY => RecordType::ANY,
            other => RecordType::from_u16(u16::from(other)),
        }
    }
}
