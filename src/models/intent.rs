use serde::{Deserialize, Serialize};

/// Default number of recommendations per request
pub const DEFAULT_RECOMMEND_COUNT: usize = 5;

/// Mood descriptor controlling the rating sort direction for genre queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Excited,
    Fun,
    Uplifting,
    Dark,
    Sad,
    Serious,
    Emotional,
}

impl Mood {
    /// Parses a mood word; unrecognized words are not an error, the caller
    /// falls back to the default ordering.
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "excited" => Some(Mood::Excited),
            "fun" => Some(Mood::Fun),
            "uplifting" => Some(Mood::Uplifting),
            "dark" => Some(Mood::Dark),
            "sad" => Some(Mood::Sad),
            "serious" => Some(Mood::Serious),
            "emotional" => Some(Mood::Emotional),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Excited => "excited",
            Mood::Fun => "fun",
            Mood::Uplifting => "uplifting",
            Mood::Dark => "dark",
            Mood::Sad => "sad",
            Mood::Serious => "serious",
            Mood::Emotional => "emotional",
        }
    }

    /// True when this mood sorts highest-rated first
    pub fn prefers_high_ratings(&self) -> bool {
        matches!(
            self,
            Mood::Happy | Mood::Excited | Mood::Fun | Mood::Uplifting
        )
    }
}

/// What one user utterance resolved to.
///
/// Produced by an [`IntentResolver`](crate::services::router::IntentResolver);
/// the chat engine turns each variant into at most one query layer call.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// The utterance named a specific movie (after fuzzy matching)
    SimilarTo {
        movie_id: u32,
        matched_title: String,
        n: usize,
    },
    /// The utterance named a genre, optionally with a mood word
    ByGenreMood {
        genre: String,
        mood: Option<Mood>,
        n: usize,
    },
    /// The utterance elides its subject ("more like that"); resolved against
    /// conversation memory by the chat engine
    FollowUp { n: Option<usize> },
    /// Nothing matched; ask the user to rephrase
    Clarify,
}
