use xab_core::TrialState;
use xab_timing::Scheduler;

use crate::config::TrialSettings;
use crate::host::{InputListener, ListenerHandleOf, TimeoutHandleOf, TrialHost};

/// Runtime record of the trial currently on screen.
pub struct ActiveTrial<H: TrialHost> {
    pub id: u64,
    pub settings: TrialSettings,
    pub state: TrialState,
    /// Set once, when the choices are shown.
    pub target_on_left: Option<bool>,
    pub timestamps: TrialTimestamps,
    pub resources: TrialResources<H>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialTimestamps {
    pub start: u64,
    pub choices_onset: Option<u64>,
}

/// Timeout and listener handles a trial holds on its host. Whatever is
/// acquired here is given back by [`TrialResources::release`].
pub struct TrialResources<H: TrialHost> {
    timeouts: Vec<TimeoutHandleOf<H>>,
    listener: Option<ListenerHandleOf<H>>,
}

impl<H: TrialHost> TrialResources<H> {
    pub fn new() -> Self {
        Self {
            timeouts: Vec::new(),
            listener: None,
        }
    }

    pub fn hold_timeout(&mut self, handle: TimeoutHandleOf<H>) {
        self.timeouts.push(handle);
    }

    pub fn hold_listener(&mut self, handle: ListenerHandleOf<H>) {
        if let Some(previous) = self.listener.replace(handle) {
            tracing::warn!(?previous, "listener replaced while still held");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timeouts.is_empty() && self.listener.is_none()
    }

    /// Cancels everything still held. Handles that already fired are
    /// cancelled too, which the host treats as a no-op. Safe to call more
    /// than once.
    pub fn release(&mut self, host: &mut H) {
        let mut cancelled = 0usize;
        for handle in self.timeouts.drain(..) {
            if host.scheduler().cancel(handle) {
                cancelled += 1;
            }
        }
        if let Some(listener) = self.listener.take() {
            host.input().cancel(listener);
        }
        if cancelled > 0 {
            tracing::trace!(cancelled, "pending timeouts cancelled");
        }
    }
}

impl<H: TrialHost> Default for TrialResources<H> {
    fn default() -> Self {
        Self::new()
    }
}
