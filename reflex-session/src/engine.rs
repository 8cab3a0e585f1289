use crate::config::SessionTiming;
use crate::text;
use reflex_core::{Button, CATALOG, Expected, LightColor, StimulusPattern, TrialPhase, TrialResult};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};

/// The trial currently owned by the engine
#[derive(Debug, Clone)]
pub struct ActiveTrial {
    /// 1-based position in the session
    pub index: usize,
    pub pattern: &'static StimulusPattern,
    pub onset_delay: Duration,
    pub phase: TrialPhase,
}

/// Drives a single trial from onset delay to evaluation.
///
/// The engine holds no clock; callers pass timestamps in so the same code
/// runs against a wall clock and a manual one.
pub struct TrialEngine<R: Rng> {
    rng: R,
    timing: SessionTiming,
    current: Option<ActiveTrial>,
}

impl<R: Rng> TrialEngine<R> {
    pub fn new(timing: SessionTiming, rng: R) -> Self {
        Self {
            rng,
            timing,
            current: None,
        }
    }

    /// Opens trial `index` with a random pattern and onset delay
    pub fn begin(&mut self, index: usize) -> &ActiveTrial {
        let pattern = &CATALOG[self.rng.random_range(0..CATALOG.len())];
        let onset_delay = self.timing.onset_delay(self.rng.random::<f64>());
        self.begin_with(index, pattern, onset_delay)
    }

    pub fn begin_with(
        &mut self,
        index: usize,
        pattern: &'static StimulusPattern,
        onset_delay: Duration,
    ) -> &ActiveTrial {
        debug!(
            trial = index,
            color = ?pattern.color,
            onset_ms = onset_delay.as_millis() as u64,
            "trial armed"
        );
        self.current.insert(ActiveTrial {
            index,
            pattern,
            onset_delay,
            phase: TrialPhase::Armed,
        })
    }

    /// Lights the stimulus. Only an armed trial can be shown; a trial closed
    /// by an early press stays dark.
    pub fn show_stimulus(&mut self, now_ns: u64) -> Option<LightColor> {
        let trial = self.current.as_mut()?;
        if trial.phase != TrialPhase::Armed {
            return None;
        }
        trial.phase = TrialPhase::ResponseWindow { onset_ns: now_ns };
        debug!(trial = trial.index, onset_ns = now_ns, "stimulus shown");
        Some(trial.pattern.color)
    }

    /// Ends the response window. Returns true when the trial is still open
    /// and needs the no-press evaluation.
    pub fn close_window(&mut self) -> bool {
        let Some(trial) = self.current.as_mut() else {
            return false;
        };
        match trial.phase {
            TrialPhase::ResponseWindow { onset_ns } => {
                trial.phase = TrialPhase::Lapsed { onset_ns };
                true
            }
            TrialPhase::Lapsed { .. } => true,
            TrialPhase::Armed | TrialPhase::Closed => false,
        }
    }

    /// Judges `input` (`None` = no press) against the open trial and closes
    /// it. Returns `None` when there is no open trial.
    pub fn evaluate(&mut self, input: Option<Button>, now_ns: u64) -> Option<TrialResult> {
        let trial = self.current.as_mut()?;
        let phase = trial.phase;
        if !phase.is_open() {
            debug!(trial = trial.index, ?input, "evaluation ignored, trial closed");
            return None;
        }
        trial.phase = TrialPhase::Closed;

        let reaction_ms = phase
            .onset_ns()
            .map(|onset| now_ns.saturating_sub(onset) / 1_000_000);
        let in_window = reaction_ms.is_some() && matches!(phase, TrialPhase::ResponseWindow { .. });

        let pattern = trial.pattern;
        let (correct, message) = match (pattern.expected, input) {
            (Expected::Withhold, None) => (true, text::WITHHELD_CORRECT.to_string()),
            (Expected::Withhold, Some(_)) => (false, text::WITHHELD_WRONG.to_string()),
            (Expected::Press(want), Some(got)) if got == want && in_window => {
                (true, text::correct_press(reaction_ms.unwrap_or_default()))
            }
            (Expected::Press(want), Some(got)) if got == want => (false, text::TOO_LATE.to_string()),
            (Expected::Press(_), None) => (false, text::TOO_LATE.to_string()),
            (Expected::Press(_), Some(got)) => (false, text::wrong_button(pattern.text, got)),
        };

        let result = TrialResult {
            trial_index: trial.index,
            pattern_text: pattern.text.to_string(),
            correct,
            reaction_time_ms: if correct && in_window {
                reaction_ms.filter(|&ms| ms > 0)
            } else {
                None
            },
            message,
        };
        info!(
            trial = result.trial_index,
            correct = result.correct,
            reaction_ms = ?result.reaction_time_ms,
            "trial evaluated"
        );
        Some(result)
    }

    pub fn current(&self) -> Option<&ActiveTrial> {
        self.current.as_ref()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const MS: u64 = 1_000_000;

    fn engine() -> TrialEngine<StdRng> {
        TrialEngine::new(SessionTiming::default(), StdRng::seed_from_u64(7))
    }

    fn armed(color: LightColor) -> TrialEngine<StdRng> {
        let mut e = engine();
        e.begin_with(1, StimulusPattern::for_color(color), Duration::from_millis(500));
        e
    }

    #[test]
    fn begin_draws_from_catalog_within_range() {
        let mut e = engine();
        for i in 1..=50 {
            let t = e.begin(i);
            assert!(CATALOG.contains(t.pattern));
            assert!(t.onset_delay >= Duration::from_millis(300));
            assert!(t.onset_delay < Duration::from_millis(1000));
            assert_eq!(t.phase, TrialPhase::Armed);
        }
    }

    #[test]
    fn timed_matching_press_is_correct() {
        let mut e = armed(LightColor::Yellow);
        assert_eq!(e.show_stimulus(1_000 * MS), Some(LightColor::Yellow));
        let r = e.evaluate(Some(Button::Right), 1_180 * MS).unwrap();
        assert!(r.correct);
        assert_eq!(r.reaction_time_ms, Some(180));
        assert_eq!(r.message, "正解（180ms）");
        assert_eq!(r.pattern_text, "黄色 → 右を押す");
    }

    #[test]
    fn zero_ms_press_is_correct_without_time() {
        let mut e = armed(LightColor::Green);
        e.show_stimulus(2_000 * MS);
        let r = e.evaluate(Some(Button::Left), 2_000 * MS).unwrap();
        assert!(r.correct);
        assert_eq!(r.reaction_time_ms, None);
        assert_eq!(r.message, "正解（0ms）");
    }

    #[test]
    fn wrong_button_names_pattern_and_button() {
        let mut e = armed(LightColor::Yellow);
        e.show_stimulus(0);
        let r = e.evaluate(Some(Button::Left), 100 * MS).unwrap();
        assert!(!r.correct);
        assert_eq!(r.reaction_time_ms, None);
        assert_eq!(r.message, "不正解（黄色 → 右を押す なのに left を押した）");
    }

    #[test]
    fn timeout_is_too_late() {
        let mut e = armed(LightColor::Green);
        e.show_stimulus(0);
        assert!(e.close_window());
        let r = e.evaluate(None, 300 * MS).unwrap();
        assert!(!r.correct);
        assert_eq!(r.message, text::TOO_LATE);
    }

    #[test]
    fn matching_press_after_window_is_too_late() {
        let mut e = armed(LightColor::Yellow);
        e.show_stimulus(0);
        assert!(e.close_window());
        let r = e.evaluate(Some(Button::Right), 310 * MS).unwrap();
        assert!(!r.correct);
        assert_eq!(r.reaction_time_ms, None);
        assert_eq!(r.message, text::TOO_LATE);
    }

    #[test]
    fn withheld_press_on_blue_is_correct_without_time() {
        let mut e = armed(LightColor::Blue);
        e.show_stimulus(0);
        e.close_window();
        let r = e.evaluate(None, 300 * MS).unwrap();
        assert!(r.correct);
        assert_eq!(r.reaction_time_ms, None);
        assert_eq!(r.message, "正解（押さなかった）");
    }

    #[test]
    fn pressing_on_blue_is_wrong() {
        let mut e = armed(LightColor::Blue);
        e.show_stimulus(0);
        let r = e.evaluate(Some(Button::Left), 120 * MS).unwrap();
        assert!(!r.correct);
        assert_eq!(r.message, "不正解（青は押さない）");
    }

    #[test]
    fn press_before_onset_closes_trial_as_miss() {
        let mut e = armed(LightColor::Green);
        let r = e.evaluate(Some(Button::Left), 100 * MS).unwrap();
        assert!(!r.correct);
        assert_eq!(r.reaction_time_ms, None);
        assert_eq!(e.show_stimulus(500 * MS), None);
        assert!(!e.close_window());
    }

    #[test]
    fn second_evaluation_is_ignored() {
        let mut e = armed(LightColor::Green);
        e.show_stimulus(0);
        assert!(e.evaluate(Some(Button::Left), 150 * MS).is_some());
        assert!(e.evaluate(Some(Button::Left), 160 * MS).is_none());
        assert!(!e.close_window());
        assert!(e.evaluate(None, 300 * MS).is_none());
    }

    #[test]
    fn nothing_to_evaluate_without_a_trial() {
        let mut e = engine();
        assert!(e.evaluate(Some(Button::Right), 0).is_none());
        assert_eq!(e.show_stimulus(0), None);
        assert!(!e.close_window());
    }
}
