use thiserror::Error;
use xab_core::ConfigError;

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("invalid trial configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("trial {0} is still running")]
    TrialInProgress(u64),
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error("trial {trial} cannot finish: nothing scheduled and no scripted key presses left")]
    Stalled { trial: u64 },
}
