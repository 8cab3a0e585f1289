pub mod schedule;
pub mod timer;

pub use schedule::Schedule;
pub use timer::{FrameSampler, FrameStats, ManualTimer, MonotonicTimer, Timer};
