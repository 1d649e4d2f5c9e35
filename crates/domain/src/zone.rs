use crate::answer::{AnswerRecord, RecordData};
use crate::config::{ConfigError, ZoneConfig};
use crate::dns_query::normalize_name;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

pub const FALLBACK_TXT: &str = "Hello!";

/// Fallback answers and authority data for the served zone.
///
/// Built once at startup from [`ZoneConfig`] and shared read-only by every
/// query handler.
#[derive(Debug, Clone)]
pub struct ZoneDefaults {
    pub server_ip: Ipv4Addr,
    pub server_ipv6: Option<Ipv6Addr>,
    pub server_domain: Arc<str>,
    pub default_txt: Arc<str>,
    pub soa_mname: Arc<str>,
    pub soa_rname: Arc<str>,
    /// SOA serial: the process start time in epoch seconds.
    pub serial: u32,
}

impl ZoneDefaults {
    pub fn from_config(cfg: &ZoneConfig, serial: u32) -> Result<Self, ConfigError> {
        let server_ip = cfg.server_ip.parse::<Ipv4Addr>().map_err(|_| {
            ConfigError::Validation(format!("server_ip must be IPv4: {}", cfg.server_ip))
        })?;
        let server_ipv6 = cfg
            .server_ipv6
            .as_deref()
            .map(|v6| {
                v6.parse::<Ipv6Addr>().map_err(|_| {
                    ConfigError::Validation(format!("server_ipv6 must be IPv6: {}", v6))
                })
            })
            .transpose()?;

        let domain = normalize_name(&cfg.server_domain);
        if domain.is_empty() {
            return Err(ConfigError::Validation(
                "server_domain cannot be empty".to_string(),
            ));
        }

        let soa_mname = cfg
            .soa_mname
            .as_deref()
            .map(normalize_name)
            .unwrap_or_else(|| format!("ns1.{}", domain));
        let soa_rname = cfg
            .soa_rname
            .as_deref()
            .map(normalize_name)
            .unwrap_or_else(|| format!("hostmaster.{}", domain));

        Ok(Self {
            server_ip,
            server_ipv6,
            default_txt: Arc::from(cfg.default_txt.as_deref().unwrap_or(FALLBACK_TXT)),
            server_domain: Arc::from(domain.as_str()),
            soa_mname: Arc::from(soa_mname.as_str()),
            soa_rname: Arc::from(soa_rname.as_str()),
            serial,
        })
    }

    /// The server's canonical name in absolute form, as served for CNAME misses.
    pub fn server_fqdn(&self) -> String {
        format!("{}.", self.server_domain)
    }

    /// Static authority record for the zone apex.
    pub fn soa_record(&self) -> AnswerRecord {
        AnswerRecord::new(RecordData::soa(
            self.soa_mname.as_ref(),
            self.soa_rname.as_ref(),
            self.serial,
        ))
        .with_owner(self.server_domain.clone())
    }
}
