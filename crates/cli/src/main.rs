use clap::Parser;
use rotor_dns_domain::{CliOverrides, ZoneDefaults};
use rotor_dns_infrastructure::dns::DnsServerHandler;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "rotor-dns")]
#[command(version)]
#[command(about = "Rotor DNS - authoritative DNS server with rotating answers")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Database path
    #[arg(long)]
    database: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// IPv4 address answered for A queries without a stored record
    #[arg(long)]
    server_ip: Option<String>,

    /// Canonical domain of this server
    #[arg(long)]
    server_domain: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind,
        database_path: cli.database,
        log_level: cli.log_level,
        server_ip: cli.server_ip,
        server_domain: cli.server_domain,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Rotor DNS Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = bootstrap::init_database(&config.database).await?;
    let zone = Arc::new(ZoneDefaults::from_config(&config.zone, bootstrap::zone_serial())?);
    info!(
        server_domain = %zone.server_domain,
        server_ip = %zone.server_ip,
        "Serving zone"
    );

    // Dependency Injection - Build all dependencies
    let repos = di::Repositories::new(pool.clone(), &zone);
    let use_cases = di::UseCases::new(&config, &repos, zone.clone());
    let dns_handler = DnsServerHandler::new(use_cases.handle_query, zone);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    server::start_dns_server(
        &config.server.dns_addr(),
        dns_handler,
        Duration::from_secs(config.server.tcp_idle_timeout_secs),
        shutdown,
    )
    .await?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}
