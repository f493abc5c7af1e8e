use anyhow::Result;
use proxi_core::{Config, ProxiContext};
use tokio;
use tracing;
use tracing_subscriber;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = start().await {
        tracing::error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn start() -> Result<()> {
    tracing::info!("Starting Proxi API server");

    let config = Config::from_env()?;
    let ctx = ProxiContext::new(config).await?;

    tracing::info!("Context initialized");

    proxi_api::run(&ctx.config.server, ctx.operations()).await
}
