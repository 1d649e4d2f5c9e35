/// Problems found while loading or checking the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {0}: {1}")]
    FileRead(String, String),

    #[error("invalid config TOML: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
