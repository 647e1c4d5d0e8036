use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::catalog::ServiceType;

/// Public professional record: the slice the scheduling paths need. Profile
/// details (bio, portfolio, photos) live in the excluded profile subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    /// Owning user account; authorization compares against this.
    pub user_id: Uuid,
    pub display_name: String,
    /// IANA timezone the calendar operates in, e.g. "America/Sao_Paulo".
    pub timezone: String,
    #[serde(default)]
    pub services_offered: Vec<ServiceType>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Professional {
    pub fn tz(&self) -> Result<Tz, AvailabilityError> {
        self.timezone
            .parse()
            .map_err(|_| AvailabilityError::InvalidTimezone(self.timezone.clone()))
    }
}

/// Recurring weekly slot in the professional's local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub professional_id: Uuid,
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWindowRequest {
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWindowRequest {
    pub day_of_week: Option<i16>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("professional not found: {0}")]
    ProfessionalNotFound(Uuid),

    #[error("availability window not found: {0}")]
    WindowNotFound(Uuid),

    #[error("invalid availability window: {0}")]
    InvalidWindow(String),

    #[error("window overlaps an existing window on the same weekday")]
    WindowOverlap,

    #[error("professional record carries an unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("data store failure: {0}")]
    Store(#[from] StoreError),
}
