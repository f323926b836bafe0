use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Pre-rendered stimulus markup (an `<img>` tag, text, any HTML).
///
/// Never parsed or sanitized; it is placed on the display verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StimulusContent(String);

impl StimulusContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for StimulusContent {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StimulusContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StimulusContent {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for StimulusContent {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Two stimuli given: the target is X itself.
    Exact,
    /// Three stimuli given: X, target and foil are independent items.
    NonExact,
}

/// X, target and foil unpacked from a trial's stimulus list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStimuli {
    pub x: StimulusContent,
    pub target: StimulusContent,
    pub foil: StimulusContent,
    pub mode: MatchMode,
}

impl ResolvedStimuli {
    /// `[x, foil]` is exact-match mode, `[x, target, foil]` is non-exact.
    pub fn resolve(stimuli: &[StimulusContent]) -> Result<Self, ConfigError> {
        match stimuli {
            [x, foil] => Ok(Self {
                x: x.clone(),
                target: x.clone(),
                foil: foil.clone(),
                mode: MatchMode::Exact,
            }),
            [x, target, foil] => Ok(Self {
                x: x.clone(),
                target: target.clone(),
                foil: foil.clone(),
                mode: MatchMode::NonExact,
            }),
            other => Err(ConfigError::StimulusCount { found: other.len() }),
        }
    }

    /// Target and foil in screen order.
    pub fn arrange(&self, target_on_left: bool) -> (&StimulusContent, &StimulusContent) {
        if target_on_left {
            (&self.target, &self.foil)
        } else {
            (&self.foil, &self.target)
        }
    }

    /// `[x, target, foil]` as a JSON array string, the format of the
    /// `stimulus` data column.
    pub fn to_json_triple(&self) -> String {
        let triple = [self.x.as_str(), self.target.as_str(), self.foil.as_str()];
        serde_json::to_string(&triple).unwrap_or_default()
    }
}
