use crate::error::ConfigError;
use crate::key::KeyCode;
use crate::stimulus::{ResolvedStimuli, StimulusContent};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LEFT_KEY: KeyCode = KeyCode::Q;
pub const DEFAULT_RIGHT_KEY: KeyCode = KeyCode::P;
pub const DEFAULT_X_DURATION_MS: u64 = 1000;
pub const DEFAULT_X_TO_AB_GAP_MS: u64 = 1000;

/// Optional upper bound on a presentation window. Written as `-1` for
/// unbounded, otherwise milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TimeLimit {
    #[default]
    Unbounded,
    Millis(u64),
}

impl TimeLimit {
    /// The window length if it actually ends. A zero-length limit never
    /// fires, same as `Unbounded`.
    pub fn as_duration(&self) -> Option<Duration> {
        match *self {
            TimeLimit::Millis(ms) if ms > 0 => Some(Duration::from_millis(ms)),
            _ => None,
        }
    }
}

impl TryFrom<i64> for TimeLimit {
    type Error = ConfigError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(TimeLimit::Unbounded),
            ms if ms >= 0 => Ok(TimeLimit::Millis(ms as u64)),
            other => Err(ConfigError::InvalidTimeLimit(other)),
        }
    }
}

impl From<TimeLimit> for i64 {
    fn from(limit: TimeLimit) -> i64 {
        match limit {
            TimeLimit::Unbounded => -1,
            TimeLimit::Millis(ms) => ms as i64,
        }
    }
}

/// Parameters of one XAB trial as supplied by the experiment timeline.
///
/// Every field except `stimuli` is optional; `None` means "use the default",
/// an explicit value (including zero) is kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(alias = "stimulus")]
    pub stimuli: Vec<StimulusContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_key: Option<KeyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_key: Option<KeyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_duration: Option<u64>,
    #[serde(
        default,
        alias = "x_durationab_gap",
        skip_serializing_if = "Option::is_none"
    )]
    pub x_to_ab_gap: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ab_duration: Option<TimeLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_duration: Option<TimeLimit>,
}

impl TrialConfig {
    pub fn new<I, S>(stimuli: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StimulusContent>,
    {
        Self {
            stimuli: stimuli.into_iter().map(Into::into).collect(),
            left_key: None,
            right_key: None,
            prompt: None,
            x_duration: None,
            x_to_ab_gap: None,
            ab_duration: None,
            trial_duration: None,
        }
    }

    pub fn with_keys(mut self, left: KeyCode, right: KeyCode) -> Self {
        self.left_key = Some(left);
        self.right_key = Some(right);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_x_duration(mut self, ms: u64) -> Self {
        self.x_duration = Some(ms);
        self
    }

    pub fn with_gap(mut self, ms: u64) -> Self {
        self.x_to_ab_gap = Some(ms);
        self
    }

    pub fn with_ab_duration(mut self, limit: TimeLimit) -> Self {
        self.ab_duration = Some(limit);
        self
    }

    pub fn with_trial_duration(mut self, limit: TimeLimit) -> Self {
        self.trial_duration = Some(limit);
        self
    }

    pub fn left_key(&self) -> KeyCode {
        self.left_key.unwrap_or(DEFAULT_LEFT_KEY)
    }

    pub fn right_key(&self) -> KeyCode {
        self.right_key.unwrap_or(DEFAULT_RIGHT_KEY)
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or("")
    }

    pub fn x_duration(&self) -> Duration {
        Duration::from_millis(self.x_duration.unwrap_or(DEFAULT_X_DURATION_MS))
    }

    pub fn x_to_ab_gap(&self) -> Duration {
        Duration::from_millis(self.x_to_ab_gap.unwrap_or(DEFAULT_X_TO_AB_GAP_MS))
    }

    pub fn ab_duration(&self) -> TimeLimit {
        self.ab_duration.unwrap_or_default()
    }

    pub fn trial_duration(&self) -> TimeLimit {
        self.trial_duration.unwrap_or_default()
    }

    pub fn resolve_stimuli(&self) -> Result<ResolvedStimuli, ConfigError> {
        ResolvedStimuli::resolve(&self.stimuli)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let cfg: TrialConfig = serde_json::from_str(r#"{"stimuli": ["a", "b"]}"#).unwrap();
        assert_eq!(cfg.left_key(), KeyCode::Q);
        assert_eq!(cfg.right_key(), KeyCode::P);
        assert_eq!(cfg.prompt(), "");
        assert_eq!(cfg.x_duration(), Duration::from_millis(1000));
        assert_eq!(cfg.x_to_ab_gap(), Duration::from_millis(1000));
        assert_eq!(cfg.ab_duration(), TimeLimit::Unbounded);
        assert_eq!(cfg.trial_duration(), TimeLimit::Unbounded);
    }

    #[test]
    fn explicit_zero_is_not_a_default() {
        let cfg = TrialConfig::new(["a", "b"]).with_x_duration(0).with_gap(0);
        assert_eq!(cfg.x_duration(), Duration::ZERO);
        assert_eq!(cfg.x_to_ab_gap(), Duration::ZERO);
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let cfg: TrialConfig = serde_json::from_str(
            r#"{"stimulus": ["a", "b", "c"], "x_durationab_gap": 250, "left_key": "f", "right_key": 74}"#,
        )
        .unwrap();
        assert_eq!(cfg.stimuli.len(), 3);
        assert_eq!(cfg.x_to_ab_gap(), Duration::from_millis(250));
        assert_eq!(cfg.left_key(), KeyCode(70));
        assert_eq!(cfg.right_key(), KeyCode(74));
    }

    #[test]
    fn time_limits_use_minus_one_for_unbounded() {
        let cfg: TrialConfig =
            serde_json::from_str(r#"{"stimuli": ["a", "b"], "ab_duration": -1, "trial_duration": 300}"#)
                .unwrap();
        assert_eq!(cfg.ab_duration(), TimeLimit::Unbounded);
        assert_eq!(cfg.trial_duration(), TimeLimit::Millis(300));
        assert!(serde_json::from_str::<TrialConfig>(r#"{"stimuli": ["a"], "ab_duration": -5}"#).is_err());

        let out = serde_json::to_value(&cfg).unwrap();
        assert_eq!(out["ab_duration"], -1);
        assert_eq!(out["trial_duration"], 300);
    }

    #[test]
    fn zero_limit_never_fires() {
        assert_eq!(TimeLimit::Millis(0).as_duration(), None);
        assert_eq!(TimeLimit::Unbounded.as_duration(), None);
        assert_eq!(
            TimeLimit::Millis(20).as_duration(),
            Some(Duration::from_millis(20))
        );
    }
}
