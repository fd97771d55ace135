//! Dataset loading and schema validation.
//!
//! Two tabular inputs: rating events (user_id, movie_id, rating) and per-movie
//! metadata with one boolean column per genre. Any schema violation is fatal
//! at startup so no partial catalog state is ever exposed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::{GenreSet, Movie, RatingEvent, GENRE_COUNT};

use super::Catalog;

/// Loads both datasets from disk and builds the catalog.
pub fn load_datasets(
    movies_path: impl AsRef<Path>,
    ratings_path: impl AsRef<Path>,
) -> AppResult<(Catalog, Vec<RatingEvent>)> {
    let movies_file = File::open(movies_path.as_ref()).map_err(|e| {
        AppError::Schema(format!(
            "cannot open movie dataset {}: {}",
            movies_path.as_ref().display(),
            e
        ))
    })?;
    let ratings_file = File::open(ratings_path.as_ref()).map_err(|e| {
        AppError::Schema(format!(
            "cannot open rating dataset {}: {}",
            ratings_path.as_ref().display(),
            e
        ))
    })?;

    let movies = read_movies(movies_file)?;
    let ratings = read_ratings(ratings_file)?;

    tracing::info!(
        movies = movies.len(),
        ratings = ratings.len(),
        "Datasets loaded"
    );

    let catalog = Catalog::build(movies, &ratings)?;
    Ok((catalog, ratings))
}

/// Parses the movie metadata CSV. Required columns: movie_id, title, and one
/// genre_N column per vocabulary entry.
pub fn read_movies<R: Read>(reader: R) -> AppResult<Vec<Movie>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::Schema(format!("unreadable movie dataset header: {}", e)))?
        .clone();

    let column = |name: &str| -> AppResult<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::Schema(format!("movie dataset missing column '{}'", name)))
    };

    let id_col = column("movie_id")?;
    let title_col = column("title")?;
    let mut genre_cols = [0usize; GENRE_COUNT];
    for (genre, slot) in genre_cols.iter_mut().enumerate() {
        *slot = column(&format!("genre_{}", genre))?;
    }

    let mut movies = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record =
            record.map_err(|e| AppError::Schema(format!("movie row {}: {}", row + 1, e)))?;

        let id: u32 = record
            .get(id_col)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| AppError::Schema(format!("movie row {}: bad movie_id", row + 1)))?;
        let title = record
            .get(title_col)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Schema(format!("movie row {}: empty title", row + 1)))?
            .to_string();

        let mut genres = GenreSet::new();
        for (genre, &col) in genre_cols.iter().enumerate() {
            let flag = record
                .get(col)
                .map(str::trim)
                .ok_or_else(|| AppError::Schema(format!("movie row {}: short record", row + 1)))?;
            match flag {
                "1" => genres.set(genre),
                "0" => {}
                other => {
                    return Err(AppError::Schema(format!(
                        "movie row {}: genre_{} must be 0 or 1, got '{}'",
                        row + 1,
                        genre,
                        other
                    )))
                }
            }
        }

        movies.push(Movie {
            id,
            title,
            genres,
            avg_rating: None,
        });
    }

    Ok(movies)
}

/// Parses the rating events CSV (user_id, movie_id, rating).
pub fn read_ratings<R: Read>(reader: R) -> AppResult<Vec<RatingEvent>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut ratings = Vec::new();
    for (row, result) in csv_reader.deserialize::<RatingEvent>().enumerate() {
        let event =
            result.map_err(|e| AppError::Schema(format!("rating row {}: {}", row + 1, e)))?;
        ratings.push(event);
    }
    Ok(ratings)
}
