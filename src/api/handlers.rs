use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Movie, GENRE_NAMES, DEFAULT_RECOMMEND_COUNT};
use crate::middleware::SessionId;
use crate::services::accounts::validate_password;
use crate::services::providers::{MetadataProvider, Sentiment, CAST_NOT_AVAILABLE};
use crate::services::router::fuzzy_best_match;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MovieSummary {
    pub id: u32,
    pub title: String,
    pub genres: Vec<&'static str>,
    pub avg_rating: Option<f64>,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            genres: movie.genres.names(),
            avg_rating: movie.avg_rating,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieDetailsResponse {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub poster_url: Option<String>,
    pub cast: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub movie_id: Option<u32>,
    pub title: Option<String>,
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub based_on: String,
    pub recommendations: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
pub struct GenreParams {
    pub genre: String,
    pub mood: Option<String>,
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenreResponse {
    pub genre: String,
    pub recommendations: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub recommendations: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    if request.username.trim().is_empty() {
        return Err(AppError::InvalidInput("Username cannot be empty".to_string()));
    }
    validate_password(&request.password)?;

    if !state.accounts.register(&request.username, &request.password)? {
        return Err(AppError::Conflict(format!(
            "Username '{}' is already taken",
            request.username
        )));
    }

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            username: request.username,
        }),
    ))
}

/// Check credentials
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<AccountResponse>> {
    if state.accounts.authenticate(&request.username, &request.password)? {
        Ok(Json(AccountResponse {
            username: request.username,
        }))
    } else {
        Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ))
    }
}

/// Genre vocabulary display names
pub async fn get_genres() -> Json<Vec<&'static str>> {
    Json(GENRE_NAMES.to_vec())
}

/// Movie details with poster/cast enrichment.
///
/// Metadata failures never fail the response; sentinels are substituted.
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<u32>,
) -> AppResult<Json<MovieDetailsResponse>> {
    let movie = state
        .recommender
        .catalog()
        .get(movie_id)
        .ok_or_else(|| AppError::MovieNotFound(format!("movie id {}", movie_id)))?
        .clone();

    let (poster_url, cast) = match &state.metadata {
        Some(provider) => {
            let (poster, cast) = enrich(provider.as_ref(), &movie.title).await;
            (poster, Some(cast))
        }
        None => (None, None),
    };

    Ok(Json(MovieDetailsResponse {
        movie: MovieSummary::from(&movie),
        poster_url,
        cast,
    }))
}

/// Top-n movies similar to the given movie (by id, or by fuzzy title)
pub async fn recommend_similar(
    State(state): State<AppState>,
    Query(params): Query<SimilarParams>,
) -> AppResult<Json<SimilarResponse>> {
    let n = params.n.unwrap_or(DEFAULT_RECOMMEND_COUNT);

    let source = match (params.movie_id, params.title.as_deref()) {
        (Some(movie_id), _) => state
            .recommender
            .catalog()
            .get(movie_id)
            .ok_or_else(|| AppError::MovieNotFound(format!("movie id {}", movie_id)))?,
        (None, Some(title)) => {
            let (movie, _) = fuzzy_best_match(title, state.recommender.catalog())
                .ok_or_else(|| AppError::MovieNotFound(title.to_string()))?;
            movie
        }
        (None, None) => {
            return Err(AppError::InvalidInput(
                "Provide either movie_id or title".to_string(),
            ))
        }
    };
    let based_on = source.title.clone();
    let source_id = source.id;

    let recommendations = state
        .recommender
        .recommend_similar(source_id, n)?
        .iter()
        .map(MovieSummary::from)
        .collect();

    Ok(Json(SimilarResponse {
        based_on,
        recommendations,
    }))
}

/// Top-n movies for a genre, ordered by the mood policy
pub async fn recommend_by_genre(
    State(state): State<AppState>,
    Query(params): Query<GenreParams>,
) -> AppResult<Json<GenreResponse>> {
    let n = params.n.unwrap_or(DEFAULT_RECOMMEND_COUNT);

    let recommendations = state
        .recommender
        .recommend_by_genre_mood(&params.genre, params.mood.as_deref(), n)?
        .iter()
        .map(MovieSummary::from)
        .collect();

    Ok(Json(GenreResponse {
        genre: params.genre,
        recommendations,
    }))
}

/// One conversational turn against the session's memory
pub async fn chat(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let memory = {
        let mut sessions = state.sessions.write().await;
        Arc::clone(sessions.entry(session_id.0).or_default())
    };
    let mut memory = memory.lock().await;

    let reply = state.engine.handle(&request.message, &mut memory);

    tracing::info!(
        session_id = %session_id,
        recommendations = reply.movies.len(),
        "Chat turn handled"
    );

    Ok(Json(ChatResponse {
        session_id: session_id.as_str(),
        reply: reply.text,
        recommendations: reply.movies.iter().map(MovieSummary::from).collect(),
    }))
}

/// Classify free-text sentiment via the configured model server
pub async fn classify_sentiment(
    State(state): State<AppState>,
    Json(request): Json<SentimentRequest>,
) -> AppResult<Json<Sentiment>> {
    let classifier = state.sentiment.as_ref().ok_or_else(|| {
        AppError::Unavailable("No sentiment classifier configured".to_string())
    })?;

    let sentiment = classifier.classify(&request.text).await?;
    Ok(Json(sentiment))
}

/// Poster and cast for a title, substituting sentinels on any provider failure
async fn enrich(provider: &dyn MetadataProvider, title: &str) -> (Option<String>, String) {
    let poster = match provider.lookup_poster(title).await {
        Ok(poster) => poster,
        Err(e) => {
            tracing::warn!(error = %e, title = %title, provider = provider.name(), "Poster lookup failed");
            None
        }
    };

    let cast = match provider.lookup_cast(title).await {
        Ok(cast) => cast,
        Err(e) => {
            tracing::warn!(error = %e, title = %title, provider = provider.name(), "Cast lookup failed");
            CAST_NOT_AVAILABLE.to_string()
        }
    };

    (poster, cast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockMetadataProvider;

    #[tokio::test]
    async fn test_enrich_substitutes_sentinels_on_failure() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_lookup_poster()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));
        provider
            .expect_lookup_cast()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));
        provider.expect_name().return_const("mock");

        let (poster, cast) = enrich(&provider, "Inception").await;
        assert_eq!(poster, None);
        assert_eq!(cast, CAST_NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_enrich_passes_through_success() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_lookup_poster()
            .returning(|_| Ok(Some("https://img/x.jpg".to_string())));
        provider
            .expect_lookup_cast()
            .returning(|_| Ok("Leonardo DiCaprio".to_string()));
        provider.expect_name().return_const("mock");

        let (poster, cast) = enrich(&provider, "Inception").await;
        assert_eq!(poster.as_deref(), Some("https://img/x.jpg"));
        assert_eq!(cast, "Leonardo DiCaprio");
    }
}
