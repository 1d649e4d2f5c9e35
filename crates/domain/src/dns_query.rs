use super::RecordType;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl DnsQuery {
    /// The name is stored lowercase and without the trailing root dot, which
    /// is the form stored records are keyed by.
    pub fn new(domain: impl AsRef<str>, record_type: RecordType) -> Self {
        Self {
            domain: Arc::from(normalize_name(domain.as_ref()).as_str()),
            record_type,
        }
    }

    pub fn is_within(&self, zone: &str) -> bool {
        let zone = normalize_name(zone);
        self.domain.as_ref() == zone || self.domain.ends_with(&format!(".{}", zone))
    }

    /// Returns the label sitting directly beneath `zone`.
    ///
    /// `api.alice.rotor.example` under `rotor.example` yields `alice`; the zone
    /// apex itself and names outside the zone yield `None`.
    pub fn label_under(&self, zone: &str) -> Option<&str> {
        let zone = normalize_name(zone);
        if zone.is_empty() {
            return None;
        }
        let prefix = self.domain.strip_suffix(zone.as_str())?.strip_suffix('.')?;
        prefix.rsplit('.').next().filter(|label| !label.is_empty())
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}
