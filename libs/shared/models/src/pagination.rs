use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Raw page/size query parameters as they arrive on a request.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page index must not be negative, got {0}")]
    NegativePage(i64),

    #[error("page size must be positive, got {0}")]
    NonPositiveSize(i64),
}

/// A validated page request. Out-of-range values fail fast here instead of
/// silently producing an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: i64,
    size: i64,
}

impl Page {
    pub fn new(page: i64, size: i64) -> Result<Self, PageError> {
        if page < 0 {
            return Err(PageError::NegativePage(page));
        }
        if size <= 0 {
            return Err(PageError::NonPositiveSize(size));
        }
        Ok(Self { page, size })
    }

    pub fn from_query(query: &PageQuery) -> Result<Self, PageError> {
        Self::new(
            query.page.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn number(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}
