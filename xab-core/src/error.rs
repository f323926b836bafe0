use thiserror::Error;

/// Problems that stop a trial from starting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("expected 2 or 3 stimuli, got {found}")]
    StimulusCount { found: usize },

    #[error("invalid key identifier {0:?}")]
    InvalidKey(String),

    #[error("invalid time limit {0}: expected -1 or a non-negative number of milliseconds")]
    InvalidTimeLimit(i64),
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
