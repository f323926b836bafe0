pub mod scheduler;
pub mod timer;

pub use scheduler::{Scheduler, TimeoutHandle, TimerQueue};
pub use timer::{HighPrecisionTimer, ManualClock, Timer, ms_between};
