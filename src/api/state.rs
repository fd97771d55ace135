use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::ConversationMemory;
use crate::services::accounts::{AccountStore, JsonAccountStore};
use crate::services::providers::{MetadataProvider, SentimentClassifier};
use crate::services::{ChatEngine, Recommender};

/// Shared application state.
///
/// The catalog and similarity model behind `recommender` are immutable after
/// startup; only the per-session conversation memories live behind a lock.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub engine: Arc<ChatEngine>,
    pub accounts: Arc<dyn AccountStore>,
    pub metadata: Option<Arc<dyn MetadataProvider>>,
    pub sentiment: Option<Arc<dyn SentimentClassifier>>,
    /// Conversation memories keyed by session id. The outer lock guards the
    /// map shape only; a chat turn locks just its own session's entry, so
    /// independent sessions never serialize against each other. Entries are
    /// never evicted, so the map grows with distinct session ids.
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<ConversationMemory>>>>>,
}

impl AppState {
    /// State with an in-memory account store and no external providers;
    /// production wiring swaps those in with the builder methods.
    pub fn new(recommender: Recommender) -> Self {
        let recommender = Arc::new(recommender);
        let engine = Arc::new(ChatEngine::new(Arc::clone(&recommender)));
        Self {
            recommender,
            engine,
            accounts: Arc::new(JsonAccountStore::in_memory()),
            metadata: None,
            sentiment: None,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_accounts(mut self, accounts: Arc<dyn AccountStore>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_sentiment(mut self, sentiment: Arc<dyn SentimentClassifier>) -> Self {
        self.sentiment = Some(sentiment);
        self
    }
}
