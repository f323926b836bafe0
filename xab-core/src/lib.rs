pub mod config;
pub mod error;
pub mod info;
pub mod key;
pub mod phase;
pub mod sentinel;
pub mod stimulus;
pub mod trial;

pub use config::{TimeLimit, TrialConfig};
pub use error::ConfigError;
pub use info::{ParameterInfo, ParameterType, PluginInfo};
pub use key::KeyCode;
pub use phase::TrialState;
pub use stimulus::{MatchMode, ResolvedStimuli, StimulusContent};
pub use trial::{Outcome, TrialResult};
