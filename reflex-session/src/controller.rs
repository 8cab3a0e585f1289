use crate::best::{BestScore, BestScoreStore};
use crate::config::SessionTiming;
use crate::engine::TrialEngine;
use crate::store::KeyValueStore;
use crate::text;
use rand::Rng;
use reflex_core::{
    Aggregate, Button, LightColor, MAX_TRIALS, Rank, StimulusPattern, TrialResult, aggregate,
};
use reflex_timing::{Schedule, Timer};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Summary,
}

/// Notifications for the display side
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StimulusShown(LightColor),
    StimulusCleared,
    Text(String),
    StartEnabled(bool),
    Finished(SessionSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub aggregate: Aggregate,
    pub rank: Rank,
    pub best: BestScore,
    pub results: Vec<TrialResult>,
}

/// Scheduled work. `session` is the generation that scheduled the task and
/// `trial` the trial index; anything that no longer matches is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Onset { session: u64, trial: usize },
    WindowClose { session: u64, trial: usize },
    NextTrial { session: u64 },
    Reset { session: u64 },
}

/// Results of the session in progress
#[derive(Debug, Clone, Default)]
struct SessionState {
    results: Vec<TrialResult>,
}

impl SessionState {
    fn trial_count(&self) -> usize {
        self.results.len()
    }
}

/// Runs sessions of `MAX_TRIALS` trials: start, trials with cooldowns in
/// between, summary, reset.
///
/// Single-threaded. The frontend calls [`SessionController::update`] every
/// frame to fire due timers and collect events.
pub struct SessionController<T, R, S>
where
    T: Timer,
    R: Rng,
    S: KeyValueStore,
{
    timer: T,
    timing: SessionTiming,
    engine: TrialEngine<R>,
    schedule: Schedule<Task>,
    phase: SessionPhase,
    session: SessionState,
    best: BestScoreStore<S>,
    generation: u64,
    lit: Option<LightColor>,
    text: String,
    events: Vec<SessionEvent>,
}

impl<T, R, S> SessionController<T, R, S>
where
    T: Timer,
    R: Rng,
    S: KeyValueStore,
{
    pub fn new(timing: SessionTiming, timer: T, rng: R, store: S) -> Self {
        Self {
            engine: TrialEngine::new(timing.clone(), rng),
            timing,
            timer,
            schedule: Schedule::new(),
            phase: SessionPhase::Idle,
            session: SessionState::default(),
            best: BestScoreStore::new(store),
            generation: 0,
            lit: None,
            text: String::new(),
            events: Vec::new(),
        }
    }

    /// Starts a session. Ignored unless idle.
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            debug!(phase = ?self.phase, "start ignored");
            return false;
        }
        self.generation += 1;
        self.session = SessionState::default();
        self.phase = SessionPhase::Running;
        info!(session = self.generation, "session started");
        self.events.push(SessionEvent::StartEnabled(false));
        self.begin_trial();
        true
    }

    /// Feeds a button press to the open trial. Returns whether it was judged.
    ///
    /// Timers already due run first, so a press that arrives after the
    /// window deadline but before the next frame is judged against a closed
    /// window.
    pub fn press(&mut self, button: Button) -> bool {
        let now = self.timer.now();
        self.run_due(now);
        if self.phase != SessionPhase::Running {
            return false;
        }
        match self.engine.evaluate(Some(button), now) {
            Some(result) => {
                self.record(result, now);
                true
            }
            None => false,
        }
    }

    /// Fires every due timer and drains pending events
    pub fn update(&mut self) -> Vec<SessionEvent> {
        let now = self.timer.now();
        self.run_due(now);
        std::mem::take(&mut self.events)
    }

    fn run_due(&mut self, now: u64) {
        while let Some((_, task)) = self.schedule.pop_due(now) {
            self.fire(task, now);
        }
    }

    fn fire(&mut self, task: Task, now: u64) {
        match task {
            Task::Onset { session, trial } => {
                if !self.is_live_trial(session, trial) {
                    return;
                }
                if let Some(color) = self.engine.show_stimulus(now) {
                    self.set_lit(Some(color));
                    self.schedule.after(
                        now,
                        self.timing.response_window(),
                        Task::WindowClose { session, trial },
                    );
                }
            }
            Task::WindowClose { session, trial } => {
                if !self.is_live_trial(session, trial) {
                    return;
                }
                self.set_lit(None);
                if self.engine.close_window() {
                    if let Some(result) = self.engine.evaluate(None, now) {
                        self.record(result, now);
                    }
                }
            }
            Task::NextTrial { session } => {
                if session == self.generation && self.phase == SessionPhase::Running {
                    self.begin_trial();
                }
            }
            Task::Reset { session } => {
                if session == self.generation && self.phase == SessionPhase::Summary {
                    self.reset();
                }
            }
        }
    }

    fn is_live_trial(&self, session: u64, trial: usize) -> bool {
        session == self.generation
            && self.phase == SessionPhase::Running
            && self.engine.current().is_some_and(|t| t.index == trial)
    }

    fn begin_trial(&mut self) {
        let now = self.timer.now();
        let index = self.session.trial_count() + 1;
        self.set_lit(None);
        let delay = self.engine.begin(index).onset_delay;
        self.set_text(text::trial_status(index, MAX_TRIALS));
        self.schedule.after(
            now,
            delay,
            Task::Onset {
                session: self.generation,
                trial: index,
            },
        );
    }

    fn record(&mut self, result: TrialResult, now: u64) {
        let message = result.message.clone();
        self.session.results.push(result);

        if self.session.trial_count() < MAX_TRIALS {
            self.set_text(text::between_trials(&message));
            self.schedule.after(
                now,
                self.timing.cooldown(),
                Task::NextTrial {
                    session: self.generation,
                },
            );
        } else {
            self.finish(now);
        }
    }

    fn finish(&mut self, now: u64) {
        self.phase = SessionPhase::Summary;
        let aggregate = aggregate(&self.session.results);
        let rank = aggregate.rank();
        if let Err(e) = self.best.merge(rank, aggregate.avg_time_ms) {
            warn!(error = %e, "could not save best score");
        }
        let best = self.best.load();
        info!(
            session = self.generation,
            correct = aggregate.correct_count,
            avg_ms = ?aggregate.avg_time_ms,
            %rank,
            "session finished"
        );

        self.set_text(text::summary(
            &aggregate,
            rank,
            &best,
            &self.session.results,
            MAX_TRIALS,
        ));
        self.events.push(SessionEvent::Finished(SessionSummary {
            aggregate,
            rank,
            best,
            results: self.session.results.clone(),
        }));
        self.schedule.after(
            now,
            self.timing.summary_hold(),
            Task::Reset {
                session: self.generation,
            },
        );
    }

    fn reset(&mut self) {
        self.session = SessionState::default();
        self.engine.reset();
        self.phase = SessionPhase::Idle;
        self.set_lit(None);
        self.set_text(String::new());
        self.events.push(SessionEvent::StartEnabled(true));
        debug!(session = self.generation, "session reset");
    }

    fn set_lit(&mut self, color: Option<LightColor>) {
        if self.lit == color {
            return;
        }
        self.lit = color;
        self.events.push(match color {
            Some(c) => SessionEvent::StimulusShown(c),
            None => SessionEvent::StimulusCleared,
        });
    }

    fn set_text(&mut self, text: String) {
        self.text = text.clone();
        self.events.push(SessionEvent::Text(text));
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Colour currently shown, if any
    pub fn lit(&self) -> Option<LightColor> {
        self.lit
    }

    pub fn start_enabled(&self) -> bool {
        self.phase == SessionPhase::Idle
    }

    pub fn status_text(&self) -> &str {
        &self.text
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.session.results
    }

    pub fn trial_count(&self) -> usize {
        self.session.trial_count()
    }

    pub fn current_pattern(&self) -> Option<&'static StimulusPattern> {
        self.engine.current().map(|t| t.pattern)
    }

    pub fn best(&self) -> BestScore {
        self.best.load()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
