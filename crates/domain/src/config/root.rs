use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::database::DatabaseConfig;
use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::zone::ZoneConfig;

/// Environment variable that overrides `zone.default_txt`.
pub const TXT_ENV_VAR: &str = "TXT";

/// Main configuration structure for Rotor DNS
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Server configuration (port, bind address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Identity and fallback answers of this server
    #[serde(default)]
    pub zone: ZoneConfig,

    /// Answer and rotation tuning
    #[serde(default)]
    pub dns: DnsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. rotor-dns.toml in current directory
    /// 3. /etc/rotor-dns/config.toml
    /// 4. Default configuration
    ///
    /// CLI overrides are applied on top, then the `TXT` environment variable.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.apply_txt_override(std::env::var(TXT_ENV_VAR).ok());
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(db) = overrides.database_path {
            self.database.path = db;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(ip) = overrides.server_ip {
            self.zone.server_ip = ip;
        }
        if let Some(domain) = overrides.server_domain {
            self.zone.server_domain = domain;
        }
    }

    /// A non-empty value replaces the configured default TXT answer.
    pub fn apply_txt_override(&mut self, txt: Option<String>) {
        if let Some(txt) = txt.filter(|t| !t.is_empty()) {
            self.zone.default_txt = Some(txt);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        self.server
            .bind_address
            .parse::<IpAddr>()
            .map_err(|_| {
                ConfigError::Validation(format!(
                    "Invalid bind address: {}",
                    self.server.bind_address
                ))
            })?;

        self.zone.server_ip.parse::<Ipv4Addr>().map_err(|_| {
            ConfigError::Validation(format!(
                "server_ip must be an IPv4 address: {}",
                self.zone.server_ip
            ))
        })?;

        if let Some(ref v6) = self.zone.server_ipv6 {
            v6.parse::<Ipv6Addr>().map_err(|_| {
                ConfigError::Validation(format!("server_ipv6 must be an IPv6 address: {}", v6))
            })?;
        }

        if self.zone.server_domain.trim_end_matches('.').is_empty() {
            return Err(ConfigError::Validation(
                "server_domain cannot be empty".to_string(),
            ));
        }

        if self.dns.rotation_max_retries == 0 {
            return Err(ConfigError::Validation(
                "rotation_max_retries must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("rotor-dns.toml").exists() {
            Some("rotor-dns.toml".to_string())
        } else if std::path::Path::new("/etc/rotor-dns/config.toml").exists() {
            Some("/etc/rotor-dns/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub database_path: Option<String>,
    pub log_level: Option<String>,
    pub server_ip: Option<String>,
    pub server_domain: Option<String>,
}
