use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_session_id, session_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Accounts
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        // Catalog
        .route("/genres", get(handlers::get_genres))
        .route("/movies/:movie_id", get(handlers::get_movie))
        // Recommendations
        .route("/recommendations/similar", get(handlers::recommend_similar))
        .route("/recommendations/genre", get(handlers::recommend_by_genre))
        // Conversation
        .route("/chat", post(handlers::chat))
        .route("/sentiment", post(handlers::classify_sentiment))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_session_id))
        .layer(middleware::from_fn(session_middleware))
        .layer(CorsLayer::permissive())
}
