pub mod access;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod pagination;

// Re-export the types every cell reaches for
pub use auth::{AuthUser, Caller, JwtClaims, JwtHeader, Role, UserRecord};
pub use catalog::ServiceType;
pub use error::AppError;
pub use pagination::{Page, PageError, PageQuery, DEFAULT_PAGE_SIZE};
