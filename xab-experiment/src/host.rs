//! Services a trial borrows from whatever is hosting it.

use std::fmt;

use xab_core::{KeyCode, TrialResult};
use xab_timing::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// X has been up for `x_duration`.
    EndX,
    /// The blank gap is over.
    EndGap,
    /// `ab_duration` elapsed; hide the choices.
    HideChoices,
    /// `trial_duration` elapsed without a response.
    Deadline,
}

/// Payload the sequencer schedules; the host hands it back when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialTimeout {
    pub trial: u64,
    pub kind: TimeoutKind,
}

/// Registration for a keyboard response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardRequest {
    pub trial: u64,
    pub valid_keys: Vec<KeyCode>,
    /// Timestamp (ns) reaction times are measured from.
    pub timing_origin: u64,
    /// Keep listening after the first match.
    pub persist: bool,
    /// Accept auto-repeat presses from a key that is held down.
    pub allow_held_key: bool,
}

/// A physical key press as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: KeyCode,
    pub at: u64,
    pub repeat: bool,
}

impl KeyPress {
    pub fn new(key: KeyCode, at: u64) -> Self {
        Self {
            key,
            at,
            repeat: false,
        }
    }
}

/// A press accepted by a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResponse {
    pub trial: u64,
    pub key: KeyCode,
    pub rt_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialEvent {
    Timeout(TrialTimeout),
    Response(KeyResponse),
}

impl TrialEvent {
    pub fn trial(&self) -> u64 {
        match self {
            TrialEvent::Timeout(t) => t.trial,
            TrialEvent::Response(r) => r.trial,
        }
    }
}

pub trait InputListener {
    type Handle: Copy + Eq + fmt::Debug;

    fn register(&mut self, request: KeyboardRequest) -> Self::Handle;

    /// Returns false if the listener was already gone.
    fn cancel(&mut self, handle: Self::Handle) -> bool;
}

/// Where stimuli are drawn. Content is markup and is passed through as is.
pub trait DisplaySurface {
    fn set_content(&mut self, html: &str);
    fn append_content(&mut self, html: &str);
    fn clear(&mut self);
}

/// Everything a trial needs from its host.
pub trait TrialHost {
    type Scheduler: Scheduler<TrialTimeout>;
    type Input: InputListener;
    type Display: DisplaySurface;

    /// Current timestamp in nanoseconds on the host's monotonic clock.
    fn now(&self) -> u64;
    fn scheduler(&mut self) -> &mut Self::Scheduler;
    fn input(&mut self) -> &mut Self::Input;
    fn display(&mut self) -> &mut Self::Display;

    /// Receives the trial's data. Called exactly once per started trial
    /// unless the trial is aborted.
    fn complete_trial(&mut self, result: TrialResult);
}

pub type TimeoutHandleOf<H> =
    <<H as TrialHost>::Scheduler as Scheduler<TrialTimeout>>::Handle;
pub type ListenerHandleOf<H> = <<H as TrialHost>::Input as InputListener>::Handle;
