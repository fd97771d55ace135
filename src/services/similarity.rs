//! Similarity matrix construction, normalization, and blending.
//!
//! Two matrices are built once at startup: collaborative (cosine over the
//! user x movie rating table, missing ratings treated as literal zero) and
//! content (cosine over genre flag vectors). Each is min-max normalized over
//! its entire value range, then blended 0.6/0.4 into the hybrid matrix that
//! all similarity queries read.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::models::RatingEvent;

/// Blend weights for the hybrid matrix. Tunable constants, not derived.
pub const COLLABORATIVE_WEIGHT: f64 = 0.6;
pub const CONTENT_WEIGHT: f64 = 0.4;

/// Dense symmetric movie x movie similarity matrix, indexed by the catalog's
/// dense movie index. The diagonal is never meaningful to queries.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.size + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    /// Pairwise cosine similarity over one feature vector per movie.
    pub fn from_feature_vectors(vectors: &[Vec<f64>]) -> Self {
        let size = vectors.len();
        let mut matrix = Self::zeros(size);
        for i in 0..size {
            matrix.set(i, i, cosine(&vectors[i], &vectors[i]));
            for j in i + 1..size {
                let score = cosine(&vectors[i], &vectors[j]);
                matrix.set(i, j, score);
                matrix.set(j, i, score);
            }
        }
        matrix
    }

    /// Min-max scales all entries into [0, 1] using a single global min and
    /// max over the whole matrix.
    ///
    /// A constant matrix has no range to scale over; it normalizes to
    /// all-zero instead of dividing by zero.
    pub fn normalize_min_max(&mut self) {
        let Some(&first) = self.data.first() else {
            return;
        };
        let mut min = first;
        let mut max = first;
        for &value in &self.data {
            min = min.min(value);
            max = max.max(value);
        }

        let range = max - min;
        if range == 0.0 {
            tracing::warn!(
                size = self.size,
                value = min,
                "Degenerate similarity matrix: constant pre-normalization, scaling to zero"
            );
            self.data.fill(0.0);
            return;
        }

        for value in &mut self.data {
            *value = (*value - min) / range;
        }
    }

    /// Elementwise weighted sum of two equally-sized matrices.
    pub fn blend(a: &Self, b: &Self, weight_a: f64, weight_b: f64) -> Self {
        assert_eq!(a.size, b.size, "blend requires equally sized matrices");
        let data = a
            .data
            .iter()
            .zip(&b.data)
            .map(|(&x, &y)| weight_a * x + weight_b * y)
            .collect();
        Self { size: a.size, data }
    }
}

/// Cosine similarity; zero-norm vectors compare as 0.0.
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// The blended similarity model all queries read from.
///
/// Built once during startup; immutable afterwards, so it can be shared across
/// sessions without locking.
#[derive(Debug)]
pub struct HybridModel {
    matrix: SimilarityMatrix,
}

impl HybridModel {
    pub fn build(catalog: &Catalog, ratings: &[RatingEvent]) -> Self {
        let mut collaborative = collaborative_matrix(catalog, ratings);
        let mut content = content_matrix(catalog);

        collaborative.normalize_min_max();
        content.normalize_min_max();

        let matrix = SimilarityMatrix::blend(
            &collaborative,
            &content,
            COLLABORATIVE_WEIGHT,
            CONTENT_WEIGHT,
        );

        tracing::info!(
            movies = matrix.size(),
            collaborative_weight = COLLABORATIVE_WEIGHT,
            content_weight = CONTENT_WEIGHT,
            "Hybrid similarity matrix built"
        );

        Self { matrix }
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }
}

/// Cosine similarity across movie columns of the user x movie rating table.
///
/// Unrated (user, movie) cells are literal 0.0, matching the dataset's
/// established densification behavior. Duplicate events for the same cell are
/// averaged.
fn collaborative_matrix(catalog: &Catalog, ratings: &[RatingEvent]) -> SimilarityMatrix {
    let n_movies = catalog.len();

    let mut user_index: HashMap<u32, usize> = HashMap::new();
    for event in ratings {
        let next = user_index.len();
        user_index.entry(event.user_id).or_insert(next);
    }
    let n_users = user_index.len();

    let mut sums = vec![vec![0.0; n_users]; n_movies];
    let mut counts = vec![vec![0u32; n_users]; n_movies];
    for event in ratings {
        let Some(movie) = catalog.index_of(event.movie_id) else {
            continue;
        };
        let user = user_index[&event.user_id];
        sums[movie][user] += event.rating;
        counts[movie][user] += 1;
    }

    let columns: Vec<Vec<f64>> = sums
        .into_iter()
        .zip(counts)
        .map(|(sums, counts)| {
            sums.into_iter()
                .zip(counts)
                .map(|(sum, count)| if count > 0 { sum / f64::from(count) } else { 0.0 })
                .collect()
        })
        .collect();

    SimilarityMatrix::from_feature_vectors(&columns)
}

/// Cosine similarity over genre flag vectors; ratings play no role here.
fn content_matrix(catalog: &Catalog) -> SimilarityMatrix {
    let vectors: Vec<Vec<f64>> = catalog
        .movies()
        .iter()
        .map(|m| m.genres.as_vector().to_vec())
        .collect();
    SimilarityMatrix::from_feature_vectors(&vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenreSet, Movie};

    const EPS: f64 = 1e-9;

    fn matrix_from(rows: Vec<Vec<f64>>) -> SimilarityMatrix {
        let size = rows.len();
        let mut matrix = SimilarityMatrix::zeros(size);
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                matrix.set(i, j, value);
            }
        }
        matrix
    }

    #[test]
    fn test_cosine_identical_vectors() {
        assert!((cosine(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < EPS);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_normalize_scales_to_unit_interval() {
        let mut matrix = matrix_from(vec![vec![2.0, 4.0], vec![6.0, 10.0]]);
        matrix.normalize_min_max();
        assert!((matrix.get(0, 0) - 0.0).abs() < EPS);
        assert!((matrix.get(0, 1) - 0.25).abs() < EPS);
        assert!((matrix.get(1, 0) - 0.5).abs() < EPS);
        assert!((matrix.get(1, 1) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut matrix = matrix_from(vec![vec![0.0, 0.25], vec![0.5, 1.0]]);
        let before = matrix.clone();
        matrix.normalize_min_max();
        for i in 0..2 {
            for j in 0..2 {
                assert!((matrix.get(i, j) - before.get(i, j)).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_normalize_constant_matrix_is_all_zero() {
        let mut matrix = matrix_from(vec![vec![3.0, 3.0], vec![3.0, 3.0]]);
        matrix.normalize_min_max();
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(matrix.get(i, j), 0.0);
                assert!(!matrix.get(i, j).is_nan());
            }
        }
    }

    #[test]
    fn test_blend_is_exact_weighted_sum() {
        let a = matrix_from(vec![
            vec![1.0, 0.5, 0.0],
            vec![0.5, 1.0, 0.25],
            vec![0.0, 0.25, 1.0],
        ]);
        let b = matrix_from(vec![
            vec![0.0, 1.0, 0.75],
            vec![1.0, 0.0, 0.5],
            vec![0.75, 0.5, 0.0],
        ]);

        let hybrid = SimilarityMatrix::blend(&a, &b, 0.6, 0.4);
        for i in 0..3 {
            for j in 0..3 {
                let expected = 0.6 * a.get(i, j) + 0.4 * b.get(i, j);
                assert!((hybrid.get(i, j) - expected).abs() < EPS);
            }
        }
    }

    fn movie_with_genres(id: u32, set: &[usize]) -> Movie {
        let mut genres = GenreSet::new();
        for &g in set {
            genres.set(g);
        }
        Movie {
            id,
            title: format!("Movie {}", id),
            genres,
            avg_rating: None,
        }
    }

    #[test]
    fn test_content_matrix_shared_genres_score_higher() {
        let movies = vec![
            movie_with_genres(1, &[1, 16]),  // Action, Thriller
            movie_with_genres(2, &[1, 16]),  // Action, Thriller
            movie_with_genres(3, &[12]),     // Musical
        ];
        let catalog = Catalog::build(movies, &[]).unwrap();
        let matrix = content_matrix(&catalog);

        assert!((matrix.get(0, 1) - 1.0).abs() < EPS);
        assert_eq!(matrix.get(0, 2), 0.0);
        assert_eq!(matrix.get(0, 1), matrix.get(1, 0));
    }

    #[test]
    fn test_collaborative_matrix_rating_patterns() {
        let movies = vec![
            movie_with_genres(1, &[]),
            movie_with_genres(2, &[]),
            movie_with_genres(3, &[]),
        ];
        // Users 1 and 2 rate movies 1 and 2 identically; movie 3 is rated by
        // a disjoint user, so its column is orthogonal to the others.
        let ratings = vec![
            RatingEvent { user_id: 1, movie_id: 1, rating: 5.0 },
            RatingEvent { user_id: 2, movie_id: 1, rating: 3.0 },
            RatingEvent { user_id: 1, movie_id: 2, rating: 5.0 },
            RatingEvent { user_id: 2, movie_id: 2, rating: 3.0 },
            RatingEvent { user_id: 3, movie_id: 3, rating: 4.0 },
        ];
        let catalog = Catalog::build(movies, &ratings).unwrap();
        let matrix = collaborative_matrix(&catalog, &ratings);

        assert!((matrix.get(0, 1) - 1.0).abs() < EPS);
        assert_eq!(matrix.get(0, 2), 0.0);
    }

    #[test]
    fn test_hybrid_build_small_fixture() {
        let movies = vec![
            movie_with_genres(1, &[1]),
            movie_with_genres(2, &[1]),
            movie_with_genres(3, &[12]),
        ];
        let ratings = vec![
            RatingEvent { user_id: 1, movie_id: 1, rating: 4.0 },
            RatingEvent { user_id: 1, movie_id: 2, rating: 4.0 },
            RatingEvent { user_id: 2, movie_id: 3, rating: 2.0 },
        ];
        let catalog = Catalog::build(movies, &ratings).unwrap();
        let model = HybridModel::build(&catalog, &ratings);

        let matrix = model.matrix();
        assert_eq!(matrix.size(), 3);
        // Movies 1 and 2 agree on both signals, movie 3 on neither.
        assert!(matrix.get(0, 1) > matrix.get(0, 2));
        for i in 0..3 {
            for j in 0..3 {
                let value = matrix.get(i, j);
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
