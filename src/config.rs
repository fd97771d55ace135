use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the rating events CSV (user_id, movie_id, rating)
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,

    /// Path to the movie metadata CSV (movie_id, title, genre_0..genre_18)
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Path to the persisted account store
    #[serde(default = "default_accounts_path")]
    pub accounts_path: String,

    /// TMDB API key; poster/cast enrichment is disabled when unset
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Sentiment model server URL; the /sentiment endpoint is disabled when unset
    pub sentiment_api_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_ratings_path() -> String {
    "data/ratings.csv".to_string()
}

fn default_movies_path() -> String {
    "data/movies.csv".to_string()
}

fn default_accounts_path() -> String {
    "data/users.json".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
