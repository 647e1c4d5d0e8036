use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{RestClient, StoreError};
use shared_utils::time::{weekday_and_time_in, weekday_index};

use crate::models::{
    AvailabilityError, AvailabilityWindow, CreateWindowRequest, Professional,
    UpdateWindowRequest,
};

/// Availability index for one professional's weekly calendar: window CRUD
/// plus the containment answer the scheduling engine asks for.
pub struct AvailabilityService {
    rest: RestClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            rest: RestClient::new(config),
        }
    }

    pub async fn get_professional(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Result<Professional, AvailabilityError> {
        debug!("Fetching professional: {}", professional_id);

        let path = format!("/rest/v1/professionals?id=eq.{}", professional_id);
        let result: Vec<Professional> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or(AvailabilityError::ProfessionalNotFound(professional_id))
    }

    pub async fn list_windows(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        debug!("Fetching availability windows for professional: {}", professional_id);

        let path = format!(
            "/rest/v1/availability_windows?professional_id=eq.{}&order=day_of_week.asc,start_time.asc",
            professional_id
        );
        let windows = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(windows)
    }

    pub async fn get_window(
        &self,
        window_id: Uuid,
        auth_token: &str,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let path = format!("/rest/v1/availability_windows?id=eq.{}", window_id);
        let result: Vec<AvailabilityWindow> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or(AvailabilityError::WindowNotFound(window_id))
    }

    pub async fn create_window(
        &self,
        professional_id: Uuid,
        request: CreateWindowRequest,
        auth_token: &str,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        debug!("Creating availability window for professional: {}", professional_id);

        validate_window_bounds(request.day_of_week, request.start_time, request.end_time)?;

        let existing = self
            .windows_for_day(professional_id, request.day_of_week, None, auth_token)
            .await?;
        ensure_no_window_overlap(&existing, request.start_time, request.end_time)?;

        let window_data = json!({
            "professional_id": professional_id,
            "day_of_week": request.day_of_week,
            "start_time": request.start_time.format("%H:%M:%S").to_string(),
            "end_time": request.end_time.format("%H:%M:%S").to_string(),
            "created_at": Utc::now().to_rfc3339(),
        });

        let result: Vec<AvailabilityWindow> = self
            .rest
            .insert("/rest/v1/availability_windows", Some(auth_token), window_data)
            .await?;

        let window = result
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyRepresentation)?;
        debug!("Availability window created with ID: {}", window.id);

        Ok(window)
    }

    pub async fn update_window(
        &self,
        window_id: Uuid,
        request: UpdateWindowRequest,
        auth_token: &str,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        debug!("Updating availability window: {}", window_id);

        let current = self.get_window(window_id, auth_token).await?;

        let day_of_week = request.day_of_week.unwrap_or(current.day_of_week);
        let start_time = request.start_time.unwrap_or(current.start_time);
        let end_time = request.end_time.unwrap_or(current.end_time);

        validate_window_bounds(day_of_week, start_time, end_time)?;

        let existing = self
            .windows_for_day(current.professional_id, day_of_week, Some(window_id), auth_token)
            .await?;
        ensure_no_window_overlap(&existing, start_time, end_time)?;

        let update_data = json!({
            "day_of_week": day_of_week,
            "start_time": start_time.format("%H:%M:%S").to_string(),
            "end_time": end_time.format("%H:%M:%S").to_string(),
        });

        let path = format!("/rest/v1/availability_windows?id=eq.{}", window_id);
        let result: Vec<AvailabilityWindow> = self
            .rest
            .update(&path, Some(auth_token), update_data)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyRepresentation.into())
    }

    pub async fn delete_window(
        &self,
        window_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AvailabilityError> {
        debug!("Deleting availability window: {}", window_id);

        let path = format!("/rest/v1/availability_windows?id=eq.{}", window_id);
        self.rest.delete(&path, Some(auth_token)).await?;

        Ok(())
    }

    /// Containment answer for the scheduling engine: does `[start, end)` sit
    /// inside a single window of this professional's weekly calendar?
    pub async fn interval_fits(
        &self,
        professional: &Professional,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<bool, AvailabilityError> {
        let tz = professional.tz()?;
        let windows = self.list_windows(professional.id, auth_token).await?;
        Ok(interval_fits_windows(&windows, tz, start, end))
    }

    async fn windows_for_day(
        &self,
        professional_id: Uuid,
        day_of_week: i16,
        exclude_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        let mut path = format!(
            "/rest/v1/availability_windows?professional_id=eq.{}&day_of_week=eq.{}",
            professional_id, day_of_week
        );

        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let windows = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(windows)
    }
}

/// Pure containment check over projected local times. Both endpoints must
/// fall on the same weekday (appointments never span midnight; the duration
/// guard rejects week-multiple spans that alias onto one weekday) and a
/// single window must contain the whole interval. Half-open: an interval
/// ending exactly at a window's end time fits.
pub fn interval_fits_windows(
    windows: &[AvailabilityWindow],
    tz: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    if end <= start {
        return false;
    }

    let (start_day, start_time) = weekday_and_time_in(tz, start);
    let (end_day, end_time) = weekday_and_time_in(tz, end);

    if start_day != end_day || end - start >= Duration::days(1) {
        return false;
    }

    let day = weekday_index(start_day);
    windows
        .iter()
        .any(|w| w.day_of_week == day && w.start_time <= start_time && end_time <= w.end_time)
}

fn validate_window_bounds(
    day_of_week: i16,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<(), AvailabilityError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AvailabilityError::InvalidWindow(
            "day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        ));
    }

    if start_time >= end_time {
        return Err(AvailabilityError::InvalidWindow(
            "start time must be before end time".to_string(),
        ));
    }

    Ok(())
}

fn ensure_no_window_overlap(
    existing: &[AvailabilityWindow],
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<(), AvailabilityError> {
    for window in existing {
        if start_time < window.end_time && end_time > window.start_time {
            return Err(AvailabilityError::WindowOverlap);
        }
    }

    Ok(())
}
