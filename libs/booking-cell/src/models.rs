use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use professional_cell::models::AvailabilityError;
use shared_database::StoreError;
use shared_models::catalog::ServiceType;
use shared_models::pagination::PageError;
use shared_utils::time::TimeRange;

/// A booked engagement between a client and a professional. `end_at` and
/// `price` are derived from the service catalog at booking time and never
/// taken from client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub service_type: ServiceType,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub price: Option<Decimal>,
    pub status: AppointmentStatus,
    pub professional_id: Uuid,
    pub client_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// The booked half-open interval `[start_at, end_at)`.
    pub fn interval(&self) -> TimeRange {
        TimeRange {
            start: self.start_at,
            end: self.end_at,
        }
    }

    /// Whether this appointment still occupies its slot. Completed bookings
    /// keep blocking the calendar; only cancellation frees it.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Terminal states accept no further transitions or edits.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    /// Catalog code such as "TATTOO_SMALL"; resolved server-side.
    pub service_type: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub professional_id: Uuid,
    pub client_id: Uuid,
}

/// Editable fields of a scheduled booking. `service_type` may only echo the
/// stored value; the slot is re-validated when `start_at` moves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: AppointmentStatus,
}

/// Filters for the gated list endpoint: exactly one of `by_client` /
/// `by_professional` selects the axis.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    pub by_client: Option<Uuid>,
    pub by_professional: Option<Uuid>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("unknown service type: {0}")]
    InvalidServiceType(String),

    #[error("appointment must start in the future")]
    InvalidDate,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("a client cannot book their own calendar")]
    SelfBookingNotAllowed,

    #[error("requested interval falls outside the professional's availability")]
    ProfessionalUnavailable,

    #[error("requested interval overlaps an existing booking")]
    TimeConflict,

    #[error("caller may not perform this operation")]
    NotAuthorized,

    #[error("{0}")]
    UpdateNotAllowed(String),

    #[error("cannot cancel an appointment that is already {0}")]
    CancellationNotAllowed(AppointmentStatus),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("data store unavailable: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SchedulingError {
    /// Stable machine code carried in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            SchedulingError::InvalidServiceType(_) => "invalid_service_type",
            SchedulingError::InvalidDate => "invalid_date",
            SchedulingError::InvalidArgument(_) => "invalid_argument",
            SchedulingError::SelfBookingNotAllowed => "self_booking_not_allowed",
            SchedulingError::ProfessionalUnavailable => "professional_unavailable",
            SchedulingError::TimeConflict => "time_conflict",
            SchedulingError::NotAuthorized => "not_authorized",
            SchedulingError::UpdateNotAllowed(_) => "update_not_allowed",
            SchedulingError::CancellationNotAllowed(_) => "cancellation_not_allowed",
            SchedulingError::InvalidTransition { .. } => "invalid_transition",
            SchedulingError::NotFound(_) => "not_found",
            SchedulingError::Transient(_) => "transient",
            SchedulingError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transient(msg) => SchedulingError::Transient(msg),
            other => SchedulingError::Internal(other.to_string()),
        }
    }
}

impl From<AvailabilityError> for SchedulingError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::ProfessionalNotFound(id) => {
                SchedulingError::NotFound(format!("professional {}", id))
            }
            AvailabilityError::Store(inner) => inner.into(),
            other => SchedulingError::Internal(other.to_string()),
        }
    }
}

impl From<PageError> for SchedulingError {
    fn from(err: PageError) -> Self {
        SchedulingError::InvalidArgument(err.to_string())
    }
}
