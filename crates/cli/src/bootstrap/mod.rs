mod database;
mod logging;

pub use database::init_database;
pub use logging::init_logging;

use rotor_dns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    config.validate()?;
    Ok(config)
}

/// SOA serial for this run: the start time in epoch seconds.
pub fn zone_serial() -> u32 {
    let now = chrono::Utc::now().timestamp();
    let serial = u32::try_from(now).unwrap_or(u32::MAX);
    info!(serial, "Zone serial assigned");
    serial
}
