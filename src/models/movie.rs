use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Closed genre vocabulary, indexed by the dataset's genre_0..genre_18 columns.
pub const GENRE_NAMES: [&str; 19] = [
    "unknown",
    "Action",
    "Adventure",
    "Animation",
    "Children's",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Fantasy",
    "Film-Noir",
    "Horror",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "War",
    "Western",
];

pub const GENRE_COUNT: usize = GENRE_NAMES.len();

/// Resolves a genre display name against the vocabulary.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn genre_index(name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    GENRE_NAMES
        .iter()
        .position(|g| g.to_lowercase() == wanted)
}

/// Set of genre flags for one movie, backed by a bitset over the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenreSet(u32);

impl GenreSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn set(&mut self, index: usize) {
        debug_assert!(index < GENRE_COUNT);
        self.0 |= 1 << index;
    }

    pub fn contains(&self, index: usize) -> bool {
        index < GENRE_COUNT && self.0 & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Genre flags as a 0/1 vector, for cosine similarity
    pub fn as_vector(&self) -> [f64; GENRE_COUNT] {
        let mut v = [0.0; GENRE_COUNT];
        for (i, slot) in v.iter_mut().enumerate() {
            if self.contains(i) {
                *slot = 1.0;
            }
        }
        v
    }

    /// Display names of all set flags, in vocabulary order
    pub fn names(&self) -> Vec<&'static str> {
        (0..GENRE_COUNT)
            .filter(|&i| self.contains(i))
            .map(|i| GENRE_NAMES[i])
            .collect()
    }
}

impl Display for GenreSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

/// A movie in the catalog, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u32,
    pub title: String,
    pub genres: GenreSet,
    /// Mean of all rating events for this movie; absent when unrated
    pub avg_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_index_case_insensitive() {
        assert_eq!(genre_index("Horror"), Some(11));
        assert_eq!(genre_index("HORROR"), Some(11));
        assert_eq!(genre_index("  horror "), Some(11));
    }

    #[test]
    fn test_genre_index_unknown() {
        assert_eq!(genre_index("zzz"), None);
        assert_eq!(genre_index(""), None);
    }

    #[test]
    fn test_genre_set_flags() {
        let mut set = GenreSet::new();
        assert!(set.is_empty());

        set.set(1); // Action
        set.set(15); // Sci-Fi
        assert!(set.contains(1));
        assert!(set.contains(15));
        assert!(!set.contains(5));
        assert_eq!(set.names(), vec!["Action", "Sci-Fi"]);
    }

    #[test]
    fn test_genre_set_vector() {
        let mut set = GenreSet::new();
        set.set(0);
        set.set(18);
        let v = set.as_vector();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[18], 1.0);
        assert_eq!(v[1..18].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn test_genre_set_out_of_range_contains() {
        let set = GenreSet::new();
        assert!(!set.contains(GENRE_COUNT));
    }
}
