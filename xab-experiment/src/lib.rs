pub mod config;
pub mod display;
pub mod error;
pub mod host;
pub mod keyboard;
pub mod markup;
pub mod runner;
pub mod side;
pub mod state;
pub mod trial;

pub use config::TrialSettings;
pub use display::{DisplayOp, RecordingDisplay};
pub use error::{RunnerError, SequencerError};
pub use host::{
    DisplaySurface, InputListener, KeyPress, KeyResponse, KeyboardRequest, TimeoutKind, TrialEvent,
    TrialHost, TrialTimeout,
};
pub use keyboard::{KeyboardRegistry, ListenerHandle};
pub use runner::{Anchor, ScriptedKey, TrialRunner};
pub use side::{FixedSide, SideAssignment};
pub use state::TrialSequencer;
