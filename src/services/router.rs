//! Intent resolution and the conversational engine.
//!
//! One free-text utterance plus the session's memory becomes at most one
//! query layer call. Intent classification is behind a strategy trait so a
//! model-backed resolver can replace the shipped rule-based one without
//! touching the engine.

use std::sync::Arc;

use levenshtein::levenshtein;

use crate::catalog::Catalog;
use crate::error::AppError;
use crate::models::{
    genre_index, ConversationMemory, Intent, Mood, Movie, ResolvedContext, GENRE_NAMES,
    DEFAULT_RECOMMEND_COUNT,
};
use crate::services::recommender::Recommender;

/// Minimum levenshtein ratio for a fuzzy title match
pub const TITLE_MATCH_THRESHOLD: f64 = 0.6;

/// Lead-in phrases stripped before title matching, longest first so shorter
/// prefixes never shadow longer ones.
const LEAD_IN_PHRASES: &[&str] = &[
    "can you recommend",
    "can you suggest",
    "movies similar to",
    "movies like",
    "something like",
    "similar to",
    "recommend me",
    "recommend",
    "suggest me",
    "suggest",
    "show me",
    "give me",
    "find me",
    "i want",
    "like",
];

const TRAILING_WORDS: &[&str] = &["movies", "movie", "films", "film", "please"];

const FOLLOW_UP_PHRASES: &[&str] = &[
    "more like that",
    "more of the same",
    "more like those",
    "another one",
    "some more",
    "another",
    "again",
    "more",
];

/// Strategy interface for turning an utterance into an [`Intent`]
pub trait IntentResolver: Send + Sync {
    fn resolve(&self, utterance: &str, memory: &ConversationMemory) -> Intent;
}

/// Rule-based resolver: count extraction, fuzzy title matching against the
/// catalog, genre/mood word spotting, and follow-up phrase detection.
pub struct RuleBasedResolver {
    catalog: Arc<Catalog>,
}

impl RuleBasedResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl IntentResolver for RuleBasedResolver {
    fn resolve(&self, utterance: &str, _memory: &ConversationMemory) -> Intent {
        let (count, remainder) = extract_count(utterance);
        let query = clean_query(&remainder);

        if query.is_empty() {
            return match count {
                // A bare number rides on whatever context the session has
                Some(n) => Intent::FollowUp { n: Some(n) },
                None => Intent::Clarify,
            };
        }

        // An utterance that is nothing but a follow-up phrase cannot name a
        // movie or genre, so it short-circuits the matchers.
        if FOLLOW_UP_PHRASES.contains(&query.as_str()) {
            return Intent::FollowUp { n: count };
        }

        let n = count.unwrap_or(DEFAULT_RECOMMEND_COUNT);
        let title_match = fuzzy_best_match(&query, &self.catalog);

        // Exact titles outrank everything; "Scream" is a movie before it is a
        // reaction.
        if let Some((movie, score)) = &title_match {
            if *score >= 1.0 {
                return Intent::SimilarTo {
                    movie_id: movie.id,
                    matched_title: movie.title.clone(),
                    n,
                };
            }
        }

        // A literal genre word beats an approximate title: "action" is a
        // genre request even though some title sits within edit distance.
        if let Some((genre, mood)) = spot_genre_and_mood(&query) {
            return Intent::ByGenreMood { genre, mood, n };
        }

        if let Some((movie, score)) = title_match {
            if score >= TITLE_MATCH_THRESHOLD {
                return Intent::SimilarTo {
                    movie_id: movie.id,
                    matched_title: movie.title.clone(),
                    n,
                };
            }
        }

        Intent::Clarify
    }
}

/// Pulls the first standalone integer out of the utterance and returns the
/// text without it.
fn extract_count(utterance: &str) -> (Option<usize>, String) {
    let mut count = None;
    let mut kept = Vec::new();
    for word in utterance.split_whitespace() {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        if count.is_none() && !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<usize>() {
                count = Some(n);
                continue;
            }
        }
        kept.push(word);
    }
    (count, kept.join(" "))
}

/// Lowercases, drops punctuation at word edges, and strips lead-in phrases
/// and filler trailers so only the subject of the request remains.
fn clean_query(text: &str) -> String {
    let mut words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        let joined = words.join(" ");
        for phrase in LEAD_IN_PHRASES {
            if joined == *phrase {
                return String::new();
            }
            if let Some(rest) = joined.strip_prefix(&format!("{} ", phrase)) {
                words = rest.split_whitespace().map(str::to_string).collect();
                changed = true;
                break;
            }
        }
    }

    while let Some(last) = words.last() {
        if TRAILING_WORDS.contains(&last.as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    words.join(" ")
}

/// Levenshtein ratio on [0, 1]; 1.0 means the strings are equal.
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Closest catalog title to the query.
///
/// Each title is compared both as-is and with its trailing "(year)" removed,
/// taking the better score. At most one candidate is accepted: highest ratio,
/// then shortest title, then lowest id.
pub fn fuzzy_best_match<'a>(query: &str, catalog: &'a Catalog) -> Option<(&'a Movie, f64)> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(&Movie, f64)> = None;
    for movie in catalog.movies() {
        let full = movie.title.to_lowercase();
        let mut score = similarity_ratio(&query, &full);
        if let Some(stripped) = strip_year_suffix(&full) {
            score = score.max(similarity_ratio(&query, stripped));
        }

        let better = match &best {
            None => true,
            Some((current, current_score)) => {
                score > *current_score
                    || (score == *current_score && movie.title.len() < current.title.len())
                    || (score == *current_score
                        && movie.title.len() == current.title.len()
                        && movie.id < current.id)
            }
        };
        if better {
            best = Some((movie, score));
        }
    }

    best.filter(|(_, score)| *score >= TITLE_MATCH_THRESHOLD)
}

/// Drops a trailing " (1995)" style release-year suffix
fn strip_year_suffix(title: &str) -> Option<&str> {
    let (head, inner) = title.strip_suffix(')')?.rsplit_once(" (")?;
    if inner.len() == 4 && inner.chars().all(|c| c.is_ascii_digit()) {
        Some(head.trim_end())
    } else {
        None
    }
}

/// First genre word in the query, with the first mood word if any
fn spot_genre_and_mood(query: &str) -> Option<(String, Option<Mood>)> {
    let words: Vec<&str> = query.split_whitespace().collect();

    let genre = words
        .iter()
        .find_map(|w| genre_index(w).map(|i| GENRE_NAMES[i].to_string()))?;
    let mood = words.iter().find_map(|w| Mood::parse(w));

    Some((genre, mood))
}

/// Reply produced by one conversational turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub movies: Vec<Movie>,
}

impl ChatReply {
    fn clarification(text: &str) -> Self {
        Self {
            text: text.to_string(),
            movies: Vec::new(),
        }
    }
}

/// Drives one session: resolve intent, run the query, update memory.
///
/// Recoverable query failures become clarification replies and leave the
/// session memory exactly as it was.
pub struct ChatEngine {
    recommender: Arc<Recommender>,
    resolver: Box<dyn IntentResolver>,
}

impl ChatEngine {
    pub fn new(recommender: Arc<Recommender>) -> Self {
        let resolver = Box::new(RuleBasedResolver::new(recommender.catalog_arc()));
        Self {
            recommender,
            resolver,
        }
    }

    pub fn with_resolver(recommender: Arc<Recommender>, resolver: Box<dyn IntentResolver>) -> Self {
        Self {
            recommender,
            resolver,
        }
    }

    pub fn handle(&self, utterance: &str, memory: &mut ConversationMemory) -> ChatReply {
        let intent = self.resolver.resolve(utterance, memory);
        tracing::debug!(utterance = %utterance, intent = ?intent, "Utterance resolved");

        match intent {
            Intent::SimilarTo {
                movie_id,
                matched_title,
                n,
            } => self.run_similar(utterance, movie_id, &matched_title, n, memory),
            Intent::ByGenreMood { genre, mood, n } => {
                self.run_genre(utterance, &genre, mood, n, memory)
            }
            Intent::FollowUp { n } => self.run_follow_up(utterance, n, memory),
            Intent::Clarify => ChatReply::clarification(
                "I can suggest movies similar to one you liked, or by genre and mood. \
                 What are you in the mood for?",
            ),
        }
    }

    fn run_similar(
        &self,
        utterance: &str,
        movie_id: u32,
        matched_title: &str,
        n: usize,
        memory: &mut ConversationMemory,
    ) -> ChatReply {
        match self.recommender.recommend_similar(movie_id, n) {
            Ok(movies) => {
                let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
                let text = format!(
                    "Because you mentioned '{}', you might enjoy: {}",
                    matched_title,
                    titles.join(", ")
                );
                memory.save(
                    utterance,
                    &format!("Recommended {} movie(s) for {}", movies.len(), matched_title),
                    ResolvedContext::Movie {
                        title: matched_title.to_string(),
                        count: n,
                    },
                );
                ChatReply { text, movies }
            }
            Err(AppError::MovieNotFound(_)) => ChatReply::clarification(&format!(
                "Sorry, I couldn't find '{}' in the catalog. Could you try another title?",
                matched_title,
            )),
            Err(e) => {
                tracing::error!(error = %e, movie_id, "Similar-movie query failed");
                ChatReply::clarification("Something went wrong on my end. Try again?")
            }
        }
    }

    fn run_genre(
        &self,
        utterance: &str,
        genre: &str,
        mood: Option<Mood>,
        n: usize,
        memory: &mut ConversationMemory,
    ) -> ChatReply {
        let mood_word = mood.map(|m| m.as_str());
        match self.recommender.recommend_by_genre_mood(genre, mood_word, n) {
            Ok(movies) if movies.is_empty() => ChatReply::clarification(&format!(
                "I don't have any {} movies to suggest. Another genre?",
                genre
            )),
            Ok(movies) => {
                let lines: Vec<String> = movies
                    .iter()
                    .map(|m| match m.avg_rating {
                        Some(rating) => {
                            format!("{} ({}) - rated {:.1}", m.title, m.genres, rating)
                        }
                        None => format!("{} ({})", m.title, m.genres),
                    })
                    .collect();
                let text = format!("Here are {} picks:\n{}", genre, lines.join("\n"));
                memory.save(
                    utterance,
                    &format!("Recommended {} {} movie(s)", movies.len(), genre),
                    ResolvedContext::Genre {
                        genre: genre.to_string(),
                        count: n,
                    },
                );
                ChatReply { text, movies }
            }
            Err(AppError::UnknownGenre(genre)) => ChatReply::clarification(&format!(
                "I don't know the genre '{}'. Try one of: {}",
                genre,
                GENRE_NAMES.join(", ")
            )),
            Err(e) => {
                tracing::error!(error = %e, genre, "Genre query failed");
                ChatReply::clarification("Something went wrong on my end. Try again?")
            }
        }
    }

    fn run_follow_up(
        &self,
        utterance: &str,
        n: Option<usize>,
        memory: &mut ConversationMemory,
    ) -> ChatReply {
        let n = n
            .or(memory.last_count())
            .unwrap_or(DEFAULT_RECOMMEND_COUNT);

        if let Some(last_movie) = memory.last_movie().map(str::to_string) {
            return match self.recommender.catalog().find_by_title(&last_movie) {
                Some(movie) => self.run_similar(utterance, movie.id, &last_movie, n, memory),
                None => ChatReply::clarification(
                    "I lost track of that movie. Which one were we talking about?",
                ),
            };
        }

        if let Some(last_genre) = memory.last_genre().map(str::to_string) {
            return self.run_genre(utterance, &last_genre, None, n, memory);
        }

        ChatReply::clarification(
            "I don't have anything to go on yet. Name a movie or a genre first.",
        )
    }
}
