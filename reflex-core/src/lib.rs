pub mod pattern;
pub mod rank;
pub mod score;
pub mod trial;

pub use pattern::{Button, CATALOG, Expected, LightColor, StimulusPattern};
pub use rank::Rank;
pub use score::{Aggregate, aggregate};
pub use trial::{MAX_TRIALS, TrialPhase, TrialResult};
