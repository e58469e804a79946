/// Wedgallery - wedding photo gallery server
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wedgallery::{
    config::{ServerConfig, DEFAULT_LOG_FILTER},
    server, AppContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_path = %config.service.base_path,
        "Starting wedgallery"
    );

    // Create application context
    let ctx = AppContext::new(config)
        .await
        .context("Failed to initialize application context")?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
