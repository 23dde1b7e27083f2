use std::sync::Arc;

use anyhow::Context;
use movie_recommender::{
    catalog::Catalog,
    config::Config,
    routes::{create_router, AppState},
    services::{providers::TmdbProvider, PosterResolver},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env()?;

    let provider = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.poster_timeout(),
    )?;
    let resolver = PosterResolver::new(Arc::new(provider), config.backfill_delay());

    // Loaded once; any missing posters are backfilled before serving
    let catalog = Catalog::load(&config.catalog_path, &config.similarity_path, &resolver)
        .await
        .context("Failed to load catalog")?;

    tracing::info!(movies = catalog.len(), "Catalog ready");

    let app = create_router(AppState::new(Arc::new(catalog)));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
