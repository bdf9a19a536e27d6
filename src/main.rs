use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anime_recommender::{
    api::{create_router, AppState},
    config::Config,
    services::{Artifacts, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anime_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Artifacts are loaded once; everything after this point is read-only
    let artifacts = Artifacts::load(&config.artifacts_dir)
        .with_context(|| format!("Failed to load artifacts from {}", config.artifacts_dir.display()))?;
    let recommender = Recommender::new(artifacts, config.scoring())?;

    let app = create_router(AppState::new(recommender));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app).await?;
    Ok(())
}
