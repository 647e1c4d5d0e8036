pub mod renderer;
pub mod views;

pub use renderer::RendererClient;
pub use views::ReportingService;
