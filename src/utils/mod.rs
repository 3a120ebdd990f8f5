pub mod clock;
pub mod stopwatch;

pub use clock::{Clock, MonotonicClock};
pub use stopwatch::StopWatch;
