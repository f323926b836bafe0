use std::time::Duration;

use xab_core::{ConfigError, KeyCode, ResolvedStimuli, TimeLimit, TrialConfig};

/// A `TrialConfig` with defaults applied and stimuli unpacked.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSettings {
    pub stimuli: ResolvedStimuli,
    pub left_key: KeyCode,
    pub right_key: KeyCode,
    pub prompt: String,
    pub x_duration: Duration,
    pub x_to_ab_gap: Duration,
    /// When to hide the choices, measured from choice onset.
    pub hide_after: Option<Duration>,
    /// Response deadline, measured from choice onset.
    pub deadline: Option<Duration>,
}

impl TrialSettings {
    pub fn from_config(config: &TrialConfig) -> Result<Self, ConfigError> {
        let stimuli = config.resolve_stimuli()?;

        for (field, limit) in [
            ("ab_duration", config.ab_duration()),
            ("trial_duration", config.trial_duration()),
        ] {
            if limit == TimeLimit::Millis(0) {
                tracing::warn!(field, "a limit of 0 ms is treated as unbounded");
            }
        }
        if config.left_key() == config.right_key() {
            tracing::warn!(key = %config.left_key(), "left and right keys are identical; every response scores as left");
        }

        Ok(Self {
            stimuli,
            left_key: config.left_key(),
            right_key: config.right_key(),
            prompt: config.prompt().to_owned(),
            x_duration: config.x_duration(),
            x_to_ab_gap: config.x_to_ab_gap(),
            hide_after: config.ab_duration().as_duration(),
            deadline: config.trial_duration().as_duration(),
        })
    }

    pub fn valid_keys(&self) -> Vec<KeyCode> {
        vec![self.left_key, self.right_key]
    }
}

impl TryFrom<&TrialConfig> for TrialSettings {
    type Error = ConfigError;

    fn try_from(config: &TrialConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}
