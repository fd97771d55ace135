mod intent;
mod memory;
mod movie;
mod rating;

pub use intent::{Intent, Mood, DEFAULT_RECOMMEND_COUNT};
pub use memory::{ConversationMemory, ResolvedContext, Speaker, Turn};
pub use movie::{genre_index, GenreSet, Movie, GENRE_COUNT, GENRE_NAMES};
pub use rating::RatingEvent;
