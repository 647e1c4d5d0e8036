use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use booking_cell::models::Appointment;
use professional_cell::models::Professional;
use shared_config::AppConfig;
use shared_database::RestClient;
use shared_models::auth::{Caller, Role};
use shared_models::pagination::Page;
use shared_utils::clock::{Clock, SystemClock};
use shared_utils::time::TimeRange;

use crate::models::ReportingError;

/// How a view partitions records around the clock's now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slice {
    All,
    Future,
    Past,
}

/// Read-only record selection for the role-scoped views and for export. The
/// contract ends at the ordered record list; rendering is the caller's
/// problem. Reads take no calendar lock.
pub struct ReportingService {
    rest: RestClient,
    clock: Arc<dyn Clock>,
}

impl ReportingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            rest: RestClient::new(config),
            clock,
        }
    }

    /// Every booking the caller holds as a client, oldest first.
    pub async fn my_bookings(
        &self,
        caller: &Caller,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        self.client_view(caller.user_id, Slice::All, page, auth_token)
            .await
    }

    pub async fn my_future_bookings(
        &self,
        caller: &Caller,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        self.client_view(caller.user_id, Slice::Future, page, auth_token)
            .await
    }

    pub async fn my_past_bookings(
        &self,
        caller: &Caller,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        self.client_view(caller.user_id, Slice::Past, page, auth_token)
            .await
    }

    pub async fn my_future_engagements(
        &self,
        caller: &Caller,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        let professional = self.professional_for(caller.user_id, auth_token).await?;
        self.professional_view(professional.id, Slice::Future, page, auth_token)
            .await
    }

    pub async fn my_past_engagements(
        &self,
        caller: &Caller,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        let professional = self.professional_for(caller.user_id, auth_token).await?;
        self.professional_view(professional.id, Slice::Past, page, auth_token)
            .await
    }

    /// Record list for an export period, ordered by start, unpaginated.
    /// Scoping follows the caller's role: clients export their bookings,
    /// professionals their engagements, admins the whole period.
    pub async fn export_records(
        &self,
        caller: &Caller,
        period: &TimeRange,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        let mut query_parts: Vec<String> = Vec::new();

        match caller.role {
            Role::Client => query_parts.push(format!("client_id=eq.{}", caller.user_id)),
            Role::Professional => {
                let professional = self.professional_for(caller.user_id, auth_token).await?;
                query_parts.push(format!("professional_id=eq.{}", professional.id));
            }
            Role::Admin => {}
        }

        query_parts.push(format!("start_at=gte.{}", encode_instant(&period.start)));
        query_parts.push(format!("start_at=lt.{}", encode_instant(&period.end)));
        query_parts.push("order=start_at.asc".to_string());

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        debug!("Export record query: {}", path);

        let appointments: Vec<Appointment> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(appointments)
    }

    async fn client_view(
        &self,
        client_id: Uuid,
        slice: Slice,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        self.fetch_view(format!("client_id=eq.{}", client_id), slice, page, auth_token)
            .await
    }

    async fn professional_view(
        &self,
        professional_id: Uuid,
        slice: Slice,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        self.fetch_view(
            format!("professional_id=eq.{}", professional_id),
            slice,
            page,
            auth_token,
        )
        .await
    }

    async fn fetch_view(
        &self,
        scope: String,
        slice: Slice,
        page: &Page,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, ReportingError> {
        let mut query_parts = vec![scope];

        // Future/past partitions on the stored start against now, not on
        // status: an elapsed Scheduled booking belongs to the past.
        match slice {
            Slice::All => {}
            Slice::Future => {
                query_parts.push(format!("start_at=gte.{}", encode_instant(&self.clock.now())))
            }
            Slice::Past => {
                query_parts.push(format!("start_at=lt.{}", encode_instant(&self.clock.now())))
            }
        }

        query_parts.push("order=start_at.asc".to_string());
        query_parts.push(format!("limit={}", page.limit()));
        query_parts.push(format!("offset={}", page.offset()));

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        debug!("Reporting view query: {}", path);

        let appointments: Vec<Appointment> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(appointments)
    }

    /// The professional profile owned by this user account.
    async fn professional_for(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Professional, ReportingError> {
        let path = format!("/rest/v1/professionals?user_id=eq.{}", user_id);
        let result: Vec<Professional> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result.into_iter().next().ok_or_else(|| {
            ReportingError::NotFound(format!("professional profile for user {}", user_id))
        })
    }
}

/// Half-open period `[first instant of the year/month, first instant of the
/// next)`, validated before any query is built.
pub fn export_period(year: i32, month: Option<u32>) -> Result<TimeRange, ReportingError> {
    if !(1970..=9999).contains(&year) {
        return Err(ReportingError::InvalidArgument(format!(
            "year must be between 1970 and 9999, got {}",
            year
        )));
    }
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return Err(ReportingError::InvalidArgument(format!(
                "month must be between 1 and 12, got {}",
                m
            )));
        }
    }

    let (end_year, end_month) = match month {
        Some(12) | None => (year + 1, 1),
        Some(m) => (year, m + 1),
    };

    let start = first_instant(year, month.unwrap_or(1))?;
    let end = first_instant(end_year, end_month)?;

    Ok(TimeRange { start, end })
}

fn first_instant(year: i32, month: u32) -> Result<DateTime<Utc>, ReportingError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            ReportingError::InvalidArgument(format!("invalid period {}-{:02}", year, month))
        })
}

fn encode_instant(instant: &DateTime<Utc>) -> String {
    urlencoding::encode(&instant.to_rfc3339_opts(SecondsFormat::Secs, true)).into_owned()
}
