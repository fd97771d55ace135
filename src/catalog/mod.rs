mod loader;

pub use loader::load_datasets;

use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, RatingEvent};

/// Immutable movie catalog, built once at startup and shared read-only.
///
/// Movies are held in ascending-id order; the position in that order is the
/// dense index used by the similarity matrices.
#[derive(Debug)]
pub struct Catalog {
    movies: Vec<Movie>,
    by_id: HashMap<u32, usize>,
}

impl Catalog {
    /// Builds the catalog from raw movies and rating events, deriving each
    /// movie's average rating from its events.
    pub fn build(mut movies: Vec<Movie>, ratings: &[RatingEvent]) -> AppResult<Self> {
        movies.sort_by_key(|m| m.id);

        let mut by_id = HashMap::with_capacity(movies.len());
        for (index, movie) in movies.iter().enumerate() {
            if by_id.insert(movie.id, index).is_some() {
                return Err(AppError::Schema(format!(
                    "duplicate movie_id {} in movie dataset",
                    movie.id
                )));
            }
        }

        // Per-movie rating mean; events referencing unknown movies are skipped
        let mut sums: HashMap<u32, (f64, u32)> = HashMap::new();
        for event in ratings {
            if by_id.contains_key(&event.movie_id) {
                let entry = sums.entry(event.movie_id).or_insert((0.0, 0));
                entry.0 += event.rating;
                entry.1 += 1;
            }
        }
        for movie in &mut movies {
            movie.avg_rating = sums
                .get(&movie.id)
                .map(|(sum, count)| sum / f64::from(*count));
        }

        Ok(Self { movies, by_id })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Movie by dataset id
    pub fn get(&self, movie_id: u32) -> Option<&Movie> {
        self.by_id.get(&movie_id).map(|&i| &self.movies[i])
    }

    /// Dense matrix index for a dataset id
    pub fn index_of(&self, movie_id: u32) -> Option<usize> {
        self.by_id.get(&movie_id).copied()
    }

    /// Movie at a dense matrix index
    pub fn by_index(&self, index: usize) -> &Movie {
        &self.movies[index]
    }

    /// All movies in ascending-id (dense index) order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Exact title lookup, ignoring case. Lowest id wins if titles collide.
    pub fn find_by_title(&self, title: &str) -> Option<&Movie> {
        self.movies
            .iter()
            .find(|m| m.title.eq_ignore_ascii_case(title))
    }
}
