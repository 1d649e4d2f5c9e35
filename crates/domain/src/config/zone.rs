use serde::{Deserialize, Serialize};

/// The server's own identity, used whenever a name has no stored record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneConfig {
    /// Fallback answer for A queries.
    pub server_ip: String,

    /// Fallback answer for AAAA queries; without it AAAA misses get no answer.
    #[serde(default)]
    pub server_ipv6: Option<String>,

    /// Canonical domain of this server, the default CNAME target and the
    /// zone under which subdomains are registered.
    pub server_domain: String,

    #[serde(default)]
    pub default_txt: Option<String>,

    #[serde(default)]
    pub soa_mname: Option<String>,

    #[serde(default)]
    pub soa_rname: Option<String>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            server_ip: "127.0.0.1".to_string(),
            server_ipv6: None,
            server_domain: "localhost".to_string(),
            default_txt: None,
            soa_mname: None,
            soa_rname: None,
        }
    }
}
