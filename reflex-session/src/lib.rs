pub mod best;
pub mod config;
pub mod controller;
pub mod engine;
pub mod store;
pub mod text;

pub use best::{BEST_SCORE_KEY, BestScore, BestScoreStore};
pub use config::SessionTiming;
pub use controller::{SessionController, SessionEvent, SessionPhase, SessionSummary};
pub use engine::{ActiveTrial, TrialEngine};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
