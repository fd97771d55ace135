use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cinerec::api::{create_router, AppState};
use cinerec::catalog::load_datasets;
use cinerec::config::Config;
use cinerec::services::accounts::JsonAccountStore;
use cinerec::services::providers::{HttpSentimentClassifier, TmdbProvider};
use cinerec::services::similarity::HybridModel;
use cinerec::services::Recommender;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    // Blocking startup: datasets in, matrices built, then everything is
    // immutable and shared read-only.
    let (catalog, ratings) = load_datasets(&config.movies_path, &config.ratings_path)?;
    let catalog = Arc::new(catalog);
    let model = HybridModel::build(&catalog, &ratings);
    let recommender = Recommender::new(Arc::clone(&catalog), model);

    let accounts = Arc::new(JsonAccountStore::open(&config.accounts_path)?);

    let mut state = AppState::new(recommender).with_accounts(accounts);
    if let Some(api_key) = config.tmdb_api_key.clone() {
        state = state.with_metadata(Arc::new(TmdbProvider::new(
            api_key,
            config.tmdb_api_url.clone(),
        )));
    } else {
        tracing::warn!("TMDB_API_KEY unset, poster/cast enrichment disabled");
    }
    if let Some(url) = config.sentiment_api_url.clone() {
        state = state.with_sentiment(Arc::new(HttpSentimentClassifier::new(url)));
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, movies = catalog.len(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
