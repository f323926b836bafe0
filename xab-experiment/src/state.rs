use xab_core::{Outcome, TrialConfig, TrialResult, TrialState};
use xab_timing::{Scheduler, ms_between};

use crate::config::TrialSettings;
use crate::error::SequencerError;
use crate::host::{
    DisplaySurface, InputListener, KeyboardRequest, TimeoutKind, TrialEvent, TrialHost,
    TrialTimeout,
};
use crate::markup;
use crate::side::SideAssignment;
use crate::trial::{ActiveTrial, TrialResources, TrialTimestamps};

enum Step {
    Continue,
    Finish(Outcome),
    Ignored,
}

/// Runs XAB trials one at a time: X, blank gap, choices, then a response
/// or a timeout. The host drives it by handing back fired timeouts and
/// accepted key presses through [`TrialSequencer::handle_event`].
pub struct TrialSequencer<H: TrialHost, R: SideAssignment> {
    side: R,
    next_trial_id: u64,
    active: Option<ActiveTrial<H>>,
}

impl<H: TrialHost, R: SideAssignment> TrialSequencer<H, R> {
    pub fn new(side: R) -> Self {
        Self {
            side,
            next_trial_id: 0,
            active: None,
        }
    }

    /// Validates `config`, shows X and schedules the rest of the trial.
    /// Nothing is drawn or scheduled if the configuration is rejected.
    pub fn start(&mut self, config: &TrialConfig, host: &mut H) -> Result<u64, SequencerError> {
        if let Some(trial) = &self.active {
            return Err(SequencerError::TrialInProgress(trial.id));
        }
        let settings = TrialSettings::from_config(config)?;

        let id = self.next_trial_id;
        self.next_trial_id += 1;
        let now = host.now();

        let mut trial = ActiveTrial {
            id,
            settings,
            state: TrialState::ShowX,
            target_on_left: None,
            timestamps: TrialTimestamps {
                start: now,
                choices_onset: None,
            },
            resources: TrialResources::new(),
        };

        host.display()
            .set_content(&markup::x_screen(&trial.settings.stimuli.x));
        let x_duration = trial.settings.x_duration;
        schedule(&mut trial, host, x_duration, TimeoutKind::EndX);

        tracing::debug!(
            trial = id,
            mode = ?trial.settings.stimuli.mode,
            x_ms = x_duration.as_millis() as u64,
            "trial started"
        );
        self.active = Some(trial);
        Ok(id)
    }

    /// Applies a fired timeout or an accepted key press. Returns false when
    /// the event does not belong to the running trial or its current state.
    pub fn handle_event(&mut self, event: TrialEvent, host: &mut H) -> bool {
        let Some(mut trial) = self.active.take() else {
            tracing::trace!(?event, "no trial running, event ignored");
            return false;
        };
        if event.trial() != trial.id {
            tracing::trace!(?event, current = trial.id, "stale event ignored");
            self.active = Some(trial);
            return false;
        }

        match self.step(&mut trial, event, host) {
            Step::Continue => {
                self.active = Some(trial);
                true
            }
            Step::Ignored => {
                tracing::trace!(?event, state = ?trial.state, "event not valid in current state");
                self.active = Some(trial);
                false
            }
            Step::Finish(outcome) => {
                finalize(trial, outcome, host);
                true
            }
        }
    }

    fn step(&mut self, trial: &mut ActiveTrial<H>, event: TrialEvent, host: &mut H) -> Step {
        use TimeoutKind::*;
        use TrialState::*;

        match (trial.state, event) {
            (ShowX, TrialEvent::Timeout(TrialTimeout { kind: EndX, .. })) => {
                host.display().clear();
                advance(trial);
                let gap = trial.settings.x_to_ab_gap;
                schedule(trial, host, gap, EndGap);
                tracing::debug!(trial = trial.id, "blank gap");
                Step::Continue
            }
            (Blank, TrialEvent::Timeout(TrialTimeout { kind: EndGap, .. })) => {
                self.show_choices(trial, host);
                Step::Continue
            }
            (Choices, TrialEvent::Timeout(TrialTimeout { kind: HideChoices, .. })) => {
                let target_on_left = trial.target_on_left.unwrap_or(true);
                let (left, right) = trial.settings.stimuli.arrange(target_on_left);
                let html = markup::choices_screen(left, right, &trial.settings.prompt, true);
                host.display().set_content(&html);
                advance(trial);
                tracing::debug!(trial = trial.id, "choices hidden");
                Step::Continue
            }
            (Choices | ChoicesHidden, TrialEvent::Timeout(TrialTimeout { kind: Deadline, .. })) => {
                Step::Finish(Outcome::Timeout)
            }
            (state, TrialEvent::Response(response)) if state.allows_input() => Step::Finish(Outcome::Response {
                key: response.key,
                rt_ms: response.rt_ms,
            }),
            _ => Step::Ignored,
        }
    }

    fn show_choices(&mut self, trial: &mut ActiveTrial<H>, host: &mut H) {
        let target_on_left = self.side.target_on_left();
        let onset = host.now();
        trial.target_on_left = Some(target_on_left);
        trial.timestamps.choices_onset = Some(onset);
        advance(trial);

        let (left, right) = trial.settings.stimuli.arrange(target_on_left);
        let display = host.display();
        display.append_content(&markup::choice(markup::Side::Left, left, false));
        display.append_content(&markup::choice(markup::Side::Right, right, false));
        if !trial.settings.prompt.is_empty() {
            display.append_content(&trial.settings.prompt);
        }

        let listener = host.input().register(KeyboardRequest {
            trial: trial.id,
            valid_keys: trial.settings.valid_keys(),
            timing_origin: onset,
            persist: false,
            allow_held_key: false,
        });
        trial.resources.hold_listener(listener);

        if let Some(hide_after) = trial.settings.hide_after {
            schedule(trial, host, hide_after, TimeoutKind::HideChoices);
        }
        if let Some(deadline) = trial.settings.deadline {
            schedule(trial, host, deadline, TimeoutKind::Deadline);
        }

        tracing::debug!(trial = trial.id, target_on_left, "choices shown");
    }

    /// Ends the running trial without reporting a result: releases its
    /// timeouts and listener and clears the display. No-op when idle.
    pub fn abort(&mut self, host: &mut H) {
        if let Some(mut trial) = self.active.take() {
            trial.resources.release(host);
            host.display().clear();
            tracing::warn!(trial = trial.id, state = ?trial.state, "trial aborted");
        }
    }

    pub fn side(&self) -> &R {
        &self.side
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_trial(&self) -> Option<u64> {
        self.active.as_ref().map(|t| t.id)
    }

    pub fn current_state(&self) -> Option<TrialState> {
        self.active.as_ref().map(|t| t.state)
    }

    /// Side of the target in the running trial, once the choices are up.
    pub fn target_on_left(&self) -> Option<bool> {
        self.active.as_ref().and_then(|t| t.target_on_left)
    }

    /// Timestamp at which the running trial's choices appeared.
    pub fn choices_onset(&self) -> Option<u64> {
        self.active.as_ref().and_then(|t| t.timestamps.choices_onset)
    }
}

impl<H: TrialHost, R: SideAssignment> Drop for TrialSequencer<H, R> {
    fn drop(&mut self) {
        if let Some(trial) = &self.active {
            if !trial.resources.is_empty() {
                tracing::warn!(trial = trial.id, "sequencer dropped with a trial still holding host resources");
            }
        }
    }
}

/// Moves the trial one step along the timed path.
fn advance<H: TrialHost>(trial: &mut ActiveTrial<H>) {
    if let Some(next) = trial.state.next() {
        trial.state = next;
    }
}

fn schedule<H: TrialHost>(
    trial: &mut ActiveTrial<H>,
    host: &mut H,
    delay: std::time::Duration,
    kind: TimeoutKind,
) {
    let handle = host.scheduler().after(delay, TrialTimeout { trial: trial.id, kind });
    trial.resources.hold_timeout(handle);
}

/// Takes the trial by value: a trial can only be finalized once.
fn finalize<H: TrialHost>(mut trial: ActiveTrial<H>, outcome: Outcome, host: &mut H) {
    trial.resources.release(host);
    trial.state = TrialState::Complete;

    let settings = &trial.settings;
    let target_on_left = trial.target_on_left.unwrap_or(true);
    let result = TrialResult::score(
        outcome,
        &settings.stimuli,
        settings.left_key,
        settings.right_key,
        target_on_left,
    );

    host.display().clear();
    tracing::info!(
        trial = trial.id,
        elapsed_ms = ms_between(trial.timestamps.start, host.now()),
        correct = result.correct,
        rt_ms = ?result.reaction_time_ms,
        key = ?result.key_press.map(|k| k.code()),
        "trial complete"
    );
    host.complete_trial(result);
}
