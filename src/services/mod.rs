pub mod accounts;
pub mod providers;
pub mod recommender;
pub mod router;
pub mod similarity;

pub use accounts::{validate_password, AccountStore, JsonAccountStore};
pub use recommender::Recommender;
pub use router::{ChatEngine, ChatReply, IntentResolver, RuleBasedResolver};
pub use similarity::{HybridModel, SimilarityMatrix};
