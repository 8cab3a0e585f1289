use serde::{Deserialize, Serialize};

/// Trials per session
pub const MAX_TRIALS: usize = 3;

/// Per-trial state machine
///
/// `Armed` is the onset delay: the light is still off but the trial is open,
/// so an early press closes it as a miss. `Lapsed` is the instant between the
/// window closing and the timeout evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    Armed,
    ResponseWindow { onset_ns: u64 },
    Lapsed { onset_ns: u64 },
    Closed,
}

impl TrialPhase {
    pub fn is_open(&self) -> bool {
        !matches!(self, TrialPhase::Closed)
    }

    pub fn onset_ns(&self) -> Option<u64> {
        match self {
            TrialPhase::ResponseWindow { onset_ns } | TrialPhase::Lapsed { onset_ns } => {
                Some(*onset_ns)
            }
            TrialPhase::Armed | TrialPhase::Closed => None,
        }
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_index: usize,
    pub pattern_text: String,
    pub correct: bool,
    pub reaction_time_ms: Option<u64>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onset_only_after_stimulus() {
        assert_eq!(TrialPhase::Armed.onset_ns(), None);
        assert_eq!(TrialPhase::ResponseWindow { onset_ns: 7 }.onset_ns(), Some(7));
        assert_eq!(TrialPhase::Lapsed { onset_ns: 9 }.onset_ns(), Some(9));
        assert!(!TrialPhase::Closed.is_open());
        assert!(TrialPhase::Armed.is_open());
    }
}
