pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

// Re-export the surface other cells consume
pub use models::{AvailabilityError, AvailabilityWindow, Professional};
pub use services::{interval_fits_windows, AvailabilityService};
