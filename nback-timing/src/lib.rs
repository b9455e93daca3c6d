pub mod scheduler;
pub mod timer;

pub use scheduler::{Scheduler, TaskHandle};
pub use timer::{ms_to_ns, HighPrecisionTimer, ManualTimer, Timer};
