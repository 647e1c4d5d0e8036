use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::RestClient;
use shared_utils::time::TimeRange;

use crate::models::{Appointment, AppointmentStatus, SchedulingError};

/// Finds active bookings standing in the way of a proposed interval.
pub struct ConflictService {
    rest: RestClient,
}

impl ConflictService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            rest: RestClient::new(config),
        }
    }

    /// Active (non-cancelled) appointments of the professional whose stored
    /// interval overlaps `interval`. The store filter mirrors the half-open
    /// predicate (`start_at < end && end_at > start`); the in-memory pass is
    /// what decides, so touching bookings never count as conflicts.
    pub async fn active_overlapping(
        &self,
        professional_id: Uuid,
        interval: &TimeRange,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        debug!(
            "Checking conflicts for professional {} from {} to {}",
            professional_id, interval.start, interval.end
        );

        let mut query_parts = vec![
            format!("professional_id=eq.{}", professional_id),
            format!("status=neq.{}", AppointmentStatus::Cancelled),
            format!("start_at=lt.{}", encode_instant(interval.end)),
            format!("end_at=gt.{}", encode_instant(interval.start)),
        ];

        if let Some(exclude_id) = exclude_appointment_id {
            query_parts.push(format!("id=neq.{}", exclude_id));
        }

        let path = format!(
            "/rest/v1/appointments?{}&order=start_at.asc",
            query_parts.join("&")
        );

        let candidates: Vec<Appointment> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let conflicting: Vec<Appointment> = candidates
            .into_iter()
            .filter(|appointment| appointment.is_active() && appointment.interval().overlaps(interval))
            .collect();

        if !conflicting.is_empty() {
            warn!(
                "Professional {} has {} bookings overlapping the requested interval",
                professional_id,
                conflicting.len()
            );
        }

        Ok(conflicting)
    }
}

fn encode_instant(instant: DateTime<Utc>) -> String {
    let formatted = instant.to_rfc3339_opts(SecondsFormat::Secs, true);
    urlencoding::encode(&formatted).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instants_encode_without_an_offset_sign() {
        let instant: DateTime<Utc> = "2026-08-24T10:00:00Z".parse().unwrap();
        let encoded = encode_instant(instant);
        // '+' in query values decodes as a space on the other end
        assert!(!encoded.contains('+'), "{encoded}");
        assert_eq!(encoded, "2026-08-24T10%3A00%3A00Z");
    }
}
