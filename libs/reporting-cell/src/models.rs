use serde::Deserialize;
use thiserror::Error;

use shared_database::StoreError;
use shared_models::pagination::PageError;

/// Query string for `/appointments/export`. `year` is required but arrives as
/// an `Option` so its absence maps onto the error taxonomy instead of an
/// extractor rejection.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Error, Debug)]
pub enum ReportingError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("report renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("store failure: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ReportingError {
    pub fn code(&self) -> &'static str {
        match self {
            ReportingError::InvalidArgument(_) => "invalid_argument",
            ReportingError::NotFound(_) => "not_found",
            ReportingError::RendererUnavailable(_) => "renderer_unavailable",
            ReportingError::Transient(_) => "transient",
            ReportingError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ReportingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transient(msg) => ReportingError::Transient(msg),
            other => ReportingError::Internal(other.to_string()),
        }
    }
}

impl From<PageError> for ReportingError {
    fn from(err: PageError) -> Self {
        ReportingError::InvalidArgument(err.to_string())
    }
}

impl From<reqwest::Error> for ReportingError {
    fn from(err: reqwest::Error) -> Self {
        ReportingError::RendererUnavailable(err.to_string())
    }
}
