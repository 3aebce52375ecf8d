pub mod clock;
pub mod date_math;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_math::CalendarUnit;
