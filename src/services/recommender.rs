//! Recommendation query layer.
//!
//! Read-only queries over the immutable catalog and hybrid similarity model.
//! All orderings are deterministic: equal similarity scores and equal ratings
//! are broken by ascending movie id.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{AppError, AppResult};
use crate::models::{genre_index, Mood, Movie};
use crate::services::similarity::HybridModel;

pub struct Recommender {
    catalog: Arc<Catalog>,
    model: HybridModel,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>, model: HybridModel) -> Self {
        Self { catalog, model }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_arc(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Top-n movies most similar to `movie_id` in the hybrid matrix.
    ///
    /// The movie itself is always excluded. Scores sort descending, ties by
    /// ascending movie id.
    pub fn recommend_similar(&self, movie_id: u32, n: usize) -> AppResult<Vec<Movie>> {
        let index = self
            .catalog
            .index_of(movie_id)
            .ok_or_else(|| AppError::MovieNotFound(format!("movie id {}", movie_id)))?;

        let row = self.model.matrix().row(index);
        let mut candidates: Vec<(usize, f64)> = row
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .map(|(j, &score)| (j, score))
            .collect();

        candidates.sort_by(|&(a_idx, a_score), &(b_idx, b_score)| {
            b_score
                .partial_cmp(&a_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.catalog.by_index(a_idx).id.cmp(&self.catalog.by_index(b_idx).id))
        });

        Ok(candidates
            .into_iter()
            .take(n)
            .map(|(j, _)| self.catalog.by_index(j).clone())
            .collect())
    }

    /// Top-n movies carrying the given genre flag, ordered by average rating
    /// according to the mood policy.
    ///
    /// Upbeat moods (and no mood at all) sort best-rated first; somber moods
    /// sort worst-rated first. Unrated movies always sort last, ties by
    /// ascending movie id.
    pub fn recommend_by_genre_mood(
        &self,
        genre: &str,
        mood: Option<&str>,
        n: usize,
    ) -> AppResult<Vec<Movie>> {
        let genre_flag = genre_index(genre)
            .ok_or_else(|| AppError::UnknownGenre(genre.trim().to_string()))?;

        let prefer_high = mood
            .and_then(Mood::parse)
            .map(|m| m.prefers_high_ratings())
            .unwrap_or(true);

        let mut matches: Vec<&Movie> = self
            .catalog
            .movies()
            .iter()
            .filter(|m| m.genres.contains(genre_flag))
            .collect();

        matches.sort_by(|a, b| {
            rating_order(a.avg_rating, b.avg_rating, prefer_high).then(a.id.cmp(&b.id))
        });

        Ok(matches.into_iter().take(n).cloned().collect())
    }
}

/// Rating comparison honoring the sort direction, with absent ratings last
/// regardless of direction.
fn rating_order(a: Option<f64>, b: Option<f64>, prefer_high: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ordering = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if prefer_high {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
