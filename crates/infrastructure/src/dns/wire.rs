use rotor_dns_domain::{AnswerRecord, RecordData};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, SOA, TXT};
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::ProtoError;

/// Longest character-string a single TXT segment can carry.
const TXT_SEGMENT_MAX: usize = 255;

/// Parses a host name as absolute, adding the root dot when it is missing.
pub fn fqdn(name: &str) -> Result<Name, ProtoError> {
    if name.ends_with('.') {
        Name::from_ascii(name)
    } else {
        Name::from_ascii(format!("{}.", name))
    }
}

pub fn to_rdata(data: &RecordData) -> Result<RData, ProtoError> {
    Ok(match data {
        RecordData::A(ip) => RData::A(A(*ip)),
        RecordData::AAAA(ip) => RData::AAAA(AAAA(*ip)),
        RecordData::CNAME(target) => RData::CNAME(CNAME(fqdn(target)?)),
        RecordData::NS(host) => RData::NS(NS(fqdn(host)?)),
        RecordData::TXT(text) => RData::TXT(TXT::new(split_txt(text))),
        RecordData::MX {
            preference,
            exchange,
        } => RData::MX(MX::new(*preference, fqdn(exchange)?)),
        RecordData::SOA {
            mname,
            rname,
            timing,
        } => RData::SOA(SOA::new(
            fqdn(mname)?,
            fqdn(rname)?,
            timing.serial,
            clamp_i32(timing.refresh),
            clamp_i32(timing.retry),
            clamp_i32(timing.expire),
            timing.minimum,
        )),
    })
}

/// Encodes an answer, owned by its override name or else by `query_name`.
pub fn to_record(answer: &AnswerRecord, query_name: &str) -> Result<Record, ProtoError> {
    let owner = fqdn(answer.owner_or(query_name))?;
    Ok(Record::from_rdata(
        owner,
        answer.ttl(),
        to_rdata(answer.data())?,
    ))
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Splits text into segments of at most 255 bytes without breaking a UTF-8
/// sequence.
fn split_txt(text: &str) -> Vec<String> {
    if text.len() <= TXT_SEGMENT_MAX {
        return vec![text.to_string()];
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if current.len() + ch.len_utf8() > TXT_SEGMENT_MAX {
            segments.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqdn_adds_root_dot() {
        assert_eq!(fqdn("rotor.example").unwrap().to_ascii(), "rotor.example.");
        assert_eq!(fqdn("rotor.example.").unwrap().to_ascii(), "rotor.example.");
        assert!(fqdn("rotor.example").unwrap().is_fqdn());
    }

    #[test]
    fn test_split_txt_respects_segment_limit() {
        assert_eq!(split_txt("short"), vec!["short".to_string()]);

        let long = "é".repeat(200);
        let segments = split_txt(&long);
        assert!(segments.len() > 1);
        assert!(segments.iter().all(|s| s.len() <= TXT_SEGMENT_MAX));
        assert_eq!(segments.concat(), long);
    }

    #[test]
    fn test_soa_timing_is_carried_over() {
        let rdata = to_rdata(&RecordData::soa("ns1.rotor.example", "hostmaster.rotor.example", 42))
            .unwrap();
        match rdata {
            RData::SOA(soa) => {
                assert_eq!(soa.serial(), 42);
                assert_eq!(soa.refresh(), 3600);
                assert_eq!(soa.retry(), 10800);
                assert_eq!(soa.expire(), 86400);
                assert_eq!(soa.minimum(), 3600);
            }
            other => panic!("expected SOA, got {:?}", other),
        }
    }
}
