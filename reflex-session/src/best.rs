use crate::store::{KeyValueStore, StoreError};
use reflex_core::Rank;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Key the personal best is stored under
pub const BEST_SCORE_KEY: &str = "reactionGameBest";

/// Persisted personal best. Either field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(rename = "avgTime", default, skip_serializing_if = "Option::is_none")]
    pub avg_time_ms: Option<u64>,
}

impl BestScore {
    /// True if the candidate is strictly faster or strictly better ranked.
    /// Missing values on either side count as infinitely bad.
    pub fn improved_by(&self, rank: Rank, avg_time_ms: Option<u64>) -> bool {
        let better_time = match (avg_time_ms, self.avg_time_ms) {
            (Some(candidate), Some(stored)) => candidate < stored,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let stored_priority = self.rank.map_or(u32::MAX, |r| r.priority());
        better_time || rank.priority() < stored_priority
    }
}

/// Better-of persistence over a key-value store
#[derive(Debug)]
pub struct BestScoreStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> BestScoreStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Missing, unreadable and malformed data all load as an empty best.
    pub fn load(&self) -> BestScore {
        let raw = match self.store.get(BEST_SCORE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BestScore::default(),
            Err(e) => {
                warn!(error = %e, "could not read best score");
                return BestScore::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring malformed best score");
            BestScore::default()
        })
    }

    /// Replaces the stored best with the candidate when it improves on it.
    /// Returns whether a write happened.
    pub fn merge(&mut self, rank: Rank, avg_time_ms: Option<u64>) -> Result<bool, StoreError> {
        let previous = self.load();
        if !previous.improved_by(rank, avg_time_ms) {
            return Ok(false);
        }
        let next = BestScore {
            rank: Some(rank),
            avg_time_ms,
        };
        let body = serde_json::to_string(&next).map_err(StoreError::Encode)?;
        self.store.set(BEST_SCORE_KEY, &body)?;
        info!(%rank, avg_ms = ?avg_time_ms, "new personal best");
        Ok(true)
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::io;
    use std::path::PathBuf;

    /// Reads nothing, refuses every write
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: PathBuf::from("best.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    fn seeded(json: &str) -> BestScoreStore<MemoryStore> {
        let mut mem = MemoryStore::new();
        mem.set(BEST_SCORE_KEY, json).unwrap();
        BestScoreStore::new(mem)
    }

    #[test]
    fn empty_store_loads_empty_best() {
        let store = BestScoreStore::new(MemoryStore::new());
        assert_eq!(store.load(), BestScore::default());
    }

    #[test]
    fn malformed_data_loads_empty_best() {
        for raw in ["{", "null", "42", "{\"avgTime\": -5}", "{\"avgTime\": \"fast\"}"] {
            assert_eq!(seeded(raw).load(), BestScore::default(), "{raw}");
        }
    }

    #[test]
    fn reads_wire_format() {
        let store = seeded(r#"{"rank":"B","avgTime":350}"#);
        assert_eq!(
            store.load(),
            BestScore {
                rank: Some(Rank::B),
                avg_time_ms: Some(350),
            }
        );
    }

    #[test]
    fn tie_does_not_write() {
        let mut store = seeded(r#"{"rank":"B","avgTime":350}"#);
        assert!(!store.merge(Rank::B, Some(350)).unwrap());
        assert_eq!(
            store.inner().get(BEST_SCORE_KEY).unwrap().as_deref(),
            Some(r#"{"rank":"B","avgTime":350}"#)
        );
    }

    #[test]
    fn faster_time_writes() {
        let mut store = seeded(r#"{"rank":"B","avgTime":350}"#);
        assert!(store.merge(Rank::B, Some(349)).unwrap());
        assert_eq!(store.load().avg_time_ms, Some(349));
    }

    #[test]
    fn better_rank_beats_slower_time() {
        let mut store = seeded(r#"{"rank":"B","avgTime":350}"#);
        assert!(store.merge(Rank::A, Some(500)).unwrap());
        assert_eq!(
            store.load(),
            BestScore {
                rank: Some(Rank::A),
                avg_time_ms: Some(500),
            }
        );
    }

    #[test]
    fn regression_does_not_write() {
        let mut store = seeded(r#"{"rank":"A","avgTime":250}"#);
        assert!(!store.merge(Rank::C, Some(400)).unwrap());
        assert!(!store.merge(Rank::D, None).unwrap());
    }

    #[test]
    fn first_session_always_writes() {
        let mut store = BestScoreStore::new(MemoryStore::new());
        assert!(store.merge(Rank::D, None).unwrap());
        assert_eq!(
            store.inner().get(BEST_SCORE_KEY).unwrap().as_deref(),
            Some(r#"{"rank":"D"}"#)
        );
    }

    #[test]
    fn unknown_stored_rank_loses_to_any_grade() {
        let mut store = seeded(r#"{"rank":"Z","avgTime":100}"#);
        assert_eq!(store.load().rank, Some(Rank::Unknown));
        assert!(store.merge(Rank::E, Some(900)).unwrap());
    }

    #[test]
    fn failed_write_is_reported_not_swallowed() {
        let mut store = BestScoreStore::new(ReadOnlyStore);
        let err = store.merge(Rank::S, Some(180)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.load(), BestScore::default());
    }

    #[test]
    fn encode_error_names_the_cause() {
        let source = serde_json::from_str::<u64>("x").unwrap_err();
        let err = StoreError::Encode(source);
        assert!(err.to_string().starts_with("could not encode value"));
    }
}
