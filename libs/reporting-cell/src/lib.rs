pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

// Re-export the surface other cells consume
pub use models::ReportingError;
pub use services::{RendererClient, ReportingService};
