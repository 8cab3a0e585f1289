use crate::rank::Rank;
use crate::trial::TrialResult;

/// Session totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub correct_count: usize,
    pub avg_time_ms: Option<u64>,
}

impl Aggregate {
    pub fn rank(&self) -> Rank {
        Rank::from_score(self.correct_count, self.avg_time_ms)
    }
}

/// Sums timed reactions and divides by the number of correct trials, so a
/// correctly withheld press pulls the average down. Halves round up.
pub fn aggregate(results: &[TrialResult]) -> Aggregate {
    let correct_count = results.iter().filter(|r| r.correct).count();
    let total: u64 = results.iter().filter_map(|r| r.reaction_time_ms).sum();

    let avg_time_ms = if correct_count > 0 {
        let n = correct_count as u64;
        Some((2 * total + n) / (2 * n))
    } else {
        None
    };

    Aggregate {
        correct_count,
        avg_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(correct: bool, reaction_time_ms: Option<u64>) -> TrialResult {
        TrialResult {
            trial_index: 1,
            pattern_text: String::new(),
            correct,
            reaction_time_ms,
            message: String::new(),
        }
    }

    #[test]
    fn averages_over_correct_trials() {
        let results = [
            result(true, Some(200)),
            result(true, Some(300)),
            result(false, None),
        ];
        let agg = aggregate(&results);
        assert_eq!(agg.correct_count, 2);
        assert_eq!(agg.avg_time_ms, Some(250));
        assert_eq!(agg.rank(), Rank::B);
    }

    #[test]
    fn no_correct_trials_has_no_average() {
        let results = [result(false, None), result(false, None)];
        let agg = aggregate(&results);
        assert_eq!(agg.correct_count, 0);
        assert_eq!(agg.avg_time_ms, None);
        assert_eq!(agg.rank(), Rank::D);
    }

    #[test]
    fn withheld_press_counts_in_the_divisor() {
        let results = [
            result(true, Some(300)),
            result(true, Some(300)),
            result(true, None),
        ];
        assert_eq!(aggregate(&results).avg_time_ms, Some(200));
    }

    #[test]
    fn rounds_half_up() {
        let results = [result(true, Some(201)), result(true, Some(202))];
        assert_eq!(aggregate(&results).avg_time_ms, Some(202));

        let results = [
            result(true, Some(100)),
            result(true, Some(100)),
            result(true, Some(101)),
        ];
        assert_eq!(aggregate(&results).avg_time_ms, Some(100));
    }

    #[test]
    fn empty_session() {
        let agg = aggregate(&[]);
        assert_eq!(agg.correct_count, 0);
        assert_eq!(agg.avg_time_ms, None);
    }
}
