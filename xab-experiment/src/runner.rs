use serde::{Deserialize, Serialize};
use xab_core::{KeyCode, TrialConfig, TrialResult};
use xab_timing::{Timer, TimerQueue};

use crate::error::RunnerError;
use crate::host::{DisplaySurface, KeyPress, TrialEvent, TrialHost, TrialTimeout};
use crate::keyboard::KeyboardRegistry;
use crate::side::SideAssignment;
use crate::state::TrialSequencer;

const NS_PER_MS: u64 = 1_000_000;

/// What a scripted key press is timed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    TrialStart,
    #[default]
    Choices,
}

/// A key press injected at a fixed offset into the trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedKey {
    pub key: KeyCode,
    pub at_ms: u64,
    #[serde(default, rename = "from")]
    pub anchor: Anchor,
    #[serde(default)]
    pub repeat: bool,
}

impl ScriptedKey {
    pub fn after_choices(key: KeyCode, at_ms: u64) -> Self {
        Self {
            key,
            at_ms,
            anchor: Anchor::Choices,
            repeat: false,
        }
    }

    pub fn after_start(key: KeyCode, at_ms: u64) -> Self {
        Self {
            key,
            at_ms,
            anchor: Anchor::TrialStart,
            repeat: false,
        }
    }

    /// Absolute due time, if its anchor has happened yet.
    fn due(&self, trial_start: u64, choices_onset: Option<u64>) -> Option<u64> {
        let origin = match self.anchor {
            Anchor::TrialStart => trial_start,
            Anchor::Choices => choices_onset?,
        };
        Some(origin.saturating_add(self.at_ms.saturating_mul(NS_PER_MS)))
    }
}

enum Next {
    Timeout(u64),
    Key(usize, u64),
}

/// Self-contained host: a timer queue, a keyboard registry and a display,
/// all on one clock. With a `ManualClock` runs are instantaneous and
/// deterministic; with a `HighPrecisionTimer` they happen in real time.
pub struct TrialRunner<T: Timer, D: DisplaySurface> {
    clock: T,
    timers: TimerQueue<TrialTimeout, T>,
    keyboard: KeyboardRegistry,
    display: D,
    results: Vec<TrialResult>,
}

impl<T: Timer, D: DisplaySurface> TrialRunner<T, D> {
    pub fn new(clock: T, display: D) -> Self {
        Self {
            timers: TimerQueue::new(clock.clone()),
            clock,
            keyboard: KeyboardRegistry::new(),
            display,
            results: Vec::new(),
        }
    }

    /// Runs one trial to completion, injecting `responses` at their
    /// scripted times. Presses that arrive while no listener is armed are
    /// dropped, as a real keyboard would be.
    pub fn run_trial<R: SideAssignment>(
        &mut self,
        sequencer: &mut TrialSequencer<Self, R>,
        config: &TrialConfig,
        responses: &[ScriptedKey],
    ) -> Result<TrialResult, RunnerError> {
        let completed_before = self.results.len();
        let trial_start = self.clock.now();
        let trial = sequencer.start(config, self)?;
        let mut script: Vec<ScriptedKey> = responses.to_vec();

        loop {
            if self.results.len() > completed_before {
                if let Some(result) = self.results.last() {
                    return Ok(result.clone());
                }
            }

            let onset = sequencer.choices_onset();
            let next_key = script
                .iter()
                .enumerate()
                .filter_map(|(i, k)| k.due(trial_start, onset).map(|due| (i, due)))
                .min_by_key(|&(i, due)| (due, i));

            // Timeouts win ties: they were registered before the press arrived.
            let next = match (self.timers.next_due(), next_key) {
                (Some(t), Some((_, k))) if t <= k => Next::Timeout(t),
                (_, Some((i, k))) => Next::Key(i, k),
                (Some(t), None) => Next::Timeout(t),
                (None, None) => {
                    sequencer.abort(self);
                    return Err(RunnerError::Stalled { trial });
                }
            };

            match next {
                Next::Timeout(due) => {
                    self.clock.sleep_until(due);
                    if let Some((_, timeout)) = self.timers.pop_due(self.clock.now()) {
                        sequencer.handle_event(TrialEvent::Timeout(timeout), self);
                    }
                }
                Next::Key(idx, due) => {
                    self.clock.sleep_until(due);
                    let scripted = script.remove(idx);
                    let press = KeyPress {
                        key: scripted.key,
                        at: self.clock.now(),
                        repeat: scripted.repeat,
                    };
                    match self.keyboard.dispatch(press) {
                        Some(response) => {
                            sequencer.handle_event(TrialEvent::Response(response), self);
                        }
                        None => tracing::debug!(trial, key = %press.key, "scripted key press ignored"),
                    }
                }
            }
        }
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn surface(&self) -> &D {
        &self.display
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn pending_timeouts(&self) -> usize {
        self.timers.len()
    }

    pub fn active_listeners(&self) -> usize {
        self.keyboard.len()
    }
}

impl<T: Timer, D: DisplaySurface> TrialHost for TrialRunner<T, D> {
    type Scheduler = TimerQueue<TrialTimeout, T>;
    type Input = KeyboardRegistry;
    type Display = D;

    fn now(&self) -> u64 {
        self.clock.now()
    }

    fn scheduler(&mut self) -> &mut Self::Scheduler {
        &mut self.timers
    }

    fn input(&mut self) -> &mut Self::Input {
        &mut self.keyboard
    }

    fn display(&mut self) -> &mut Self::Display {
        &mut self.display
    }

    fn complete_trial(&mut self, result: TrialResult) {
        self.results.push(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RecordingDisplay;
    use crate::side::FixedSide;
    use xab_core::TimeLimit;
    use xab_timing::ManualClock;

    fn runner() -> TrialRunner<ManualClock, RecordingDisplay> {
        TrialRunner::new(ManualClock::new(), RecordingDisplay::new())
    }

    #[test]
    fn scripted_keys_deserialize_with_default_anchor() {
        let keys: Vec<ScriptedKey> =
            serde_json::from_str(r#"[{"key": "q", "at_ms": 150}, {"key": 80, "at_ms": 900, "from": "trial_start"}]"#)
                .unwrap();
        assert_eq!(keys[0], ScriptedKey::after_choices(KeyCode::Q, 150));
        assert_eq!(keys[1], ScriptedKey::after_start(KeyCode::P, 900));
    }

    #[test]
    fn keys_before_choices_are_dropped() {
        let mut r = runner();
        let mut seq = TrialSequencer::new(FixedSide(true));
        let cfg = TrialConfig::new(["x", "y"]).with_x_duration(100).with_gap(100);
        let script = [
            ScriptedKey::after_start(KeyCode::P, 50),
            ScriptedKey::after_choices(KeyCode::Q, 30),
        ];
        let result = r.run_trial(&mut seq, &cfg, &script).unwrap();
        assert_eq!(result.key_press, Some(KeyCode::Q));
        assert_eq!(result.reaction_time_ms, Some(30));
        assert!(result.correct);
    }

    #[test]
    fn stalls_without_deadline_or_keys() {
        let mut r = runner();
        let mut seq = TrialSequencer::new(FixedSide(true));
        let err = r
            .run_trial(&mut seq, &TrialConfig::new(["x", "y"]), &[])
            .unwrap_err();
        assert!(matches!(err, RunnerError::Stalled { trial: 0 }));
        assert!(!seq.is_active());
        assert_eq!(r.active_listeners(), 0);
        assert!(r.results().is_empty());
    }

    #[test]
    fn deadline_tie_goes_to_timeout() {
        let mut r = runner();
        let mut seq = TrialSequencer::new(FixedSide(true));
        let cfg = TrialConfig::new(["x", "y"])
            .with_x_duration(10)
            .with_gap(10)
            .with_trial_duration(TimeLimit::Millis(300));
        let result = r
            .run_trial(&mut seq, &cfg, &[ScriptedKey::after_choices(KeyCode::Q, 300)])
            .unwrap();
        assert!(result.timed_out());
        assert_eq!(r.pending_timeouts(), 0);
    }

    #[test]
    fn far_future_press_loses_to_deadline() {
        let script: Vec<ScriptedKey> =
            serde_json::from_str(r#"[{"key": "q", "at_ms": 20000000000000}]"#).unwrap();
        assert_eq!(script[0].due(0, None), None);
        assert_eq!(script[0].due(0, Some(7)), Some(u64::MAX));
        assert_eq!(script[0].due(0, Some(u64::MAX - 1)), Some(u64::MAX));

        let mut r = runner();
        let mut seq = TrialSequencer::new(FixedSide(true));
        let cfg = TrialConfig::new(["x", "y"])
            .with_x_duration(10)
            .with_gap(10)
            .with_trial_duration(TimeLimit::Millis(300));
        let result = r.run_trial(&mut seq, &cfg, &script).unwrap();
        assert!(result.timed_out());
        assert_eq!(r.clock().now_ms(), 320);
    }

    #[test]
    fn consecutive_trials_share_the_runner() {
        let mut r = runner();
        let mut seq = TrialSequencer::new(FixedSide(false));
        let cfg = TrialConfig::new(["x", "a", "b"]).with_x_duration(10).with_gap(10);
        for rt in [100, 200, 300] {
            r.run_trial(&mut seq, &cfg, &[ScriptedKey::after_choices(KeyCode::P, rt)])
                .unwrap();
        }
        let rts: Vec<_> = r.results().iter().map(|res| res.reaction_time_ms).collect();
        assert_eq!(rts, vec![Some(100), Some(200), Some(300)]);
        assert!(r.results().iter().all(|res| res.correct));
        assert_eq!(r.clock().now_ms(), 660);
    }
}
