/// TMDB metadata provider
///
/// Poster and cast lookups go by title:
/// 1. /search/movie -> first result's TMDB id + poster_path
/// 2. /movie/{id}/credits -> cast list (top 10 names)
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::providers::{MetadataProvider, CAST_NOT_AVAILABLE},
};

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const MAX_CAST_NAMES: usize = 10;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: u64,
    #[serde(default)]
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// First search hit for a title, or None when TMDB has never heard of it
    async fn search_first(&self, title: &str) -> AppResult<Option<SearchResult>> {
        let url = format!("{}/search/movie", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let search: SearchResponse = response.json().await?;
        Ok(search.results.into_iter().next())
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn lookup_poster(&self, title: &str) -> AppResult<Option<String>> {
        let result = self.search_first(title).await?;
        let poster = result.and_then(|r| r.poster_path).map(poster_url);

        tracing::debug!(
            title = %title,
            found = poster.is_some(),
            provider = "tmdb",
            "Poster lookup completed"
        );

        Ok(poster)
    }

    async fn lookup_cast(&self, title: &str) -> AppResult<String> {
        let Some(result) = self.search_first(title).await? else {
            return Ok(CAST_NOT_AVAILABLE.to_string());
        };

        let url = format!("{}/movie/{}/credits", self.api_url, result.id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "TMDB credits returned status {}",
                status
            )));
        }

        let credits: CreditsResponse = response.json().await?;
        Ok(join_cast(&credits.cast))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

/// Full poster image URL for a TMDB poster path
fn poster_url(poster_path: String) -> String {
    format!("{}{}", POSTER_BASE_URL, poster_path)
}

/// Top cast names as one display string, sentinel when empty
fn join_cast(cast: &[CastMember]) -> String {
    if cast.is_empty() {
        return CAST_NOT_AVAILABLE.to_string();
    }
    cast.iter()
        .take(MAX_CAST_NAMES)
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_url() {
        assert_eq!(
            poster_url("/abc123.jpg".to_string()),
            "https://image.tmdb.org/t/p/w500/abc123.jpg"
        );
    }

    #[test]
    fn test_join_cast_empty_is_sentinel() {
        assert_eq!(join_cast(&[]), CAST_NOT_AVAILABLE);
    }

    #[test]
    fn test_join_cast_caps_at_ten() {
        let cast: Vec<CastMember> = (0..12)
            .map(|i| CastMember {
                name: format!("Actor {}", i),
            })
            .collect();
        let joined = join_cast(&cast);
        assert_eq!(joined.matches(", ").count(), 9);
        assert!(joined.starts_with("Actor 0"));
        assert!(joined.ends_with("Actor 9"));
    }

    #[test]
    fn test_search_response_deserializes() {
        let json = r#"{"results":[{"id":27205,"poster_path":"/ince.jpg","title":"Inception"}]}"#;
        let search: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(search.results[0].id, 27205);
        assert_eq!(search.results[0].poster_path.as_deref(), Some("/ince.jpg"));
    }

    #[test]
    fn test_search_response_missing_poster() {
        let json = r#"{"results":[{"id":1}]}"#;
        let search: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(search.results[0].poster_path, None);
    }
}
