use anyhow::{Context, Result};
use book_catalog::configuration::Configuration;
use book_catalog::{connection_pool, controllers, honeycomb};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "book_catalog=info,warp=info";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Configuration::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());
    match &config.honeycomb {
        Some(honeycomb_config) => {
            let tracer = honeycomb::get_honeycomb_tracer(honeycomb_config)?;
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
        }
        None => registry.init(),
    }
    info!(media = ?config.media, "Starting book catalog.");

    connection_pool::run_migrations(&config.database_url)?;
    std::fs::create_dir_all(&config.media.root).with_context(|| {
        format!(
            "Failed to create media root {}",
            config.media.root.display()
        )
    })?;

    let pool = connection_pool::establish_connection_pool(&config.database_url);
    info!(address = %config.bind_address, "Serving catalog.");
    controllers::get_server_future(&pool, &config).await;

    opentelemetry::global::shutdown_tracer_provider();
    Ok(())
}
