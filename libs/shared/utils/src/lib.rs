pub mod clock;
pub mod extractor;
pub mod jwt;
pub mod state;
pub mod test_utils;
pub mod time;

// Re-export what cells use on every request path
pub use clock::{Clock, FixedClock, SystemClock};
pub use state::{AppState, CalendarLocks};
pub use time::{weekday_and_time_in, weekday_index, TimeRange};
