use std::sync::Arc;

use anyhow::Context;

use quantii_api::app::{AppServices, build_app};
use quantii_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    quantii_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let services = AppServices::from_config(&config)
        .await
        .context("failed to open document store")?;

    if config.seed_demo {
        services
            .inventory
            .seed_if_empty()
            .await
            .context("failed to seed demo inventory")?;
    }

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
