use reqwest::Client;
use tracing::{debug, error, info};

use booking_cell::models::Appointment;
use shared_config::AppConfig;

use crate::models::ReportingError;

/// Client for the external report renderer. The façade hands over the ordered
/// record list; layout and typography live entirely on the renderer side.
pub struct RendererClient {
    http: Client,
    base_url: String,
}

impl RendererClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.report_renderer_url.clone(),
        }
    }

    /// POST /render with the record list; the response body is the PDF.
    pub async fn render(&self, records: &[Appointment]) -> Result<Vec<u8>, ReportingError> {
        let url = format!("{}/render", self.base_url);
        debug!("Rendering {} records via {}", records.len(), url);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&records)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await?;
            error!("Report renderer failed: {} - {}", status, detail);
            return Err(ReportingError::RendererUnavailable(format!(
                "HTTP {}",
                status
            )));
        }

        let pdf = response.bytes().await?;
        info!("Renderer returned {} bytes", pdf.len());

        Ok(pdf.to_vec())
    }
}
