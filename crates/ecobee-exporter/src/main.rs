//! ecobee exporter binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ecobee_client::EcobeeClient;
use ecobee_exporter::{Cli, Commands, ExporterConfig, ExporterServer, authorize};
use ecobee_metrics::{EcobeeCollector, MetricCatalog, MetricsHandler};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ExporterConfig::from_cli(&cli).context("invalid configuration")?;
    let client = EcobeeClient::new(config.client_config()).context("failed to build API client")?;

    match cli.subcommand() {
        Commands::Serve => serve(config, client).await,
        Commands::Authorize => {
            let mut stdout = std::io::stdout();
            authorize(&client, &mut stdout)
                .await
                .context("authorization failed")?;
            Ok(())
        }
    }
}

async fn serve(config: ExporterConfig, client: EcobeeClient) -> Result<()> {
    let catalog = Arc::new(MetricCatalog::new(&config.metric_prefix)?);
    let collector = EcobeeCollector::new(client, catalog).with_config(config.collector_config());
    let server = ExporterServer::new(MetricsHandler::new(collector));
    let addr = config.resolve_listen_address().await?;

    info!(
        listen_address = %config.listen_address,
        addr = %addr,
        cache = %config.cache_path.display(),
        prefix = %config.metric_prefix,
        weather = config.include_weather,
        "starting ecobee exporter"
    );

    server
        .serve_with_shutdown(addr, async {
            if matches!(tokio::signal::ctrl_c().await, Ok(())) {
                info!("received SIGINT, initiating shutdown");
            }
        })
        .await?;
    Ok(())
}
