pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

// Re-export the surface other cells consume
pub use models::{Appointment, AppointmentStatus, SchedulingError};
pub use services::BookingService;
