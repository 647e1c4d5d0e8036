pub mod availability;

pub use availability::{interval_fits_windows, AvailabilityService};
