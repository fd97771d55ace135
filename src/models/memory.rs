use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// The subject a successful recommendation resolved to.
///
/// Exactly one of movie or genre is carried per turn, so a save can never leave
/// both context fields populated.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedContext {
    Movie { title: String, count: usize },
    Genre { genre: String, count: usize },
}

/// Session-scoped conversation state.
///
/// Lives for the session lifetime, single writer. The three context fields are
/// replaced together on every successful recommendation and left untouched when
/// resolution fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationMemory {
    last_movie: Option<String>,
    last_genre: Option<String>,
    last_count: Option<usize>,
    transcript: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_movie(&self) -> Option<&str> {
        self.last_movie.as_deref()
    }

    pub fn last_genre(&self) -> Option<&str> {
        self.last_genre.as_deref()
    }

    pub fn last_count(&self) -> Option<usize> {
        self.last_count
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Records a completed turn: appends both utterances to the transcript and
    /// replaces the resolution context in one step.
    pub fn save(&mut self, input: &str, output_summary: &str, context: ResolvedContext) {
        let at = Utc::now();
        self.transcript.push(Turn {
            speaker: Speaker::User,
            text: input.to_string(),
            at,
        });
        self.transcript.push(Turn {
            speaker: Speaker::Assistant,
            text: output_summary.to_string(),
            at,
        });

        match context {
            ResolvedContext::Movie { title, count } => {
                self.last_movie = Some(title);
                self.last_genre = None;
                self.last_count = Some(count);
            }
            ResolvedContext::Genre { genre, count } => {
                self.last_movie = None;
                self.last_genre = Some(genre);
                self.last_count = Some(count);
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_movie_clears_genre() {
        let mut memory = ConversationMemory::new();
        memory.save(
            "comedy movies",
            "Recommended 5 Comedy movies",
            ResolvedContext::Genre {
                genre: "Comedy".to_string(),
                count: 5,
            },
        );
        assert_eq!(memory.last_genre(), Some("Comedy"));

        memory.save(
            "like Inception",
            "Recommended 3 movies for Inception",
            ResolvedContext::Movie {
                title: "Inception".to_string(),
                count: 3,
            },
        );
        assert_eq!(memory.last_movie(), Some("Inception"));
        assert_eq!(memory.last_genre(), None);
        assert_eq!(memory.last_count(), Some(3));
    }

    #[test]
    fn test_transcript_order() {
        let mut memory = ConversationMemory::new();
        memory.save(
            "horror",
            "Recommended 5 Horror movies",
            ResolvedContext::Genre {
                genre: "Horror".to_string(),
                count: 5,
            },
        );
        let turns = memory.transcript();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[1].speaker, Speaker::Assistant);
    }
}
