use serde::Deserialize;

/// A single rating event from the dataset, read-only after load
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RatingEvent {
    pub user_id: u32,
    pub movie_id: u32,
    pub rating: f64,
}
