use std::sync::Arc;

use chrono::SecondsFormat;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use professional_cell::services::availability::AvailabilityService;
use shared_database::{RestClient, StoreError};
use shared_models::access;
use shared_models::auth::{Caller, UserRecord};
use shared_models::catalog::ServiceType;
use shared_models::pagination::Page;
use shared_utils::clock::{Clock, SystemClock};
use shared_utils::state::AppState;
use shared_utils::time::TimeRange;

use crate::models::{
    Appointment, AppointmentStatus, CreateAppointmentRequest, SchedulingError,
    UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictService;
use crate::services::lifecycle::LifecycleService;

const MAX_DESCRIPTION_CHARS: usize = 500;

/// The scheduling engine. Every mutation takes the caller's resolved identity
/// and re-validates the full target state; writes to one professional's
/// calendar serialize on the per-professional lock in [`AppState`].
pub struct BookingService {
    state: Arc<AppState>,
    rest: RestClient,
    conflicts: ConflictService,
    availability: AvailabilityService,
    lifecycle: LifecycleService,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self::with_clock(state, Arc::new(SystemClock))
    }

    pub fn with_clock(state: &Arc<AppState>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rest: RestClient::new(&state.config),
            conflicts: ConflictService::new(&state.config),
            availability: AvailabilityService::new(&state.config),
            lifecycle: LifecycleService::new(),
            clock,
            state: Arc::clone(state),
        }
    }

    #[instrument(skip(self, request, caller, auth_token), fields(professional_id = %request.professional_id, client_id = %request.client_id))]
    pub async fn create(
        &self,
        request: CreateAppointmentRequest,
        caller: &Caller,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking {} for client {} with professional {}",
            request.service_type, request.client_id, request.professional_id
        );

        // **Step 1: Resolve the service type against the catalog**
        let service = ServiceType::parse(&request.service_type)
            .ok_or_else(|| SchedulingError::InvalidServiceType(request.service_type.clone()))?;

        // **Step 2: Clean the description**
        let description = clean_description(&request.description)?;

        // **Step 3: The start must lie strictly in the future**
        if request.start_at <= self.clock.now() {
            return Err(SchedulingError::InvalidDate);
        }

        // **Step 4: The catalog fixes the duration; clients never pick end_at**
        let interval = TimeRange::span(request.start_at, service.duration());

        // **Step 5: Resolve both parties and authorize the booking**
        let professional = self
            .availability
            .get_professional(request.professional_id, auth_token)
            .await?;
        let client = self.fetch_client(request.client_id, auth_token).await?;

        if client.id == professional.user_id {
            return Err(SchedulingError::SelfBookingNotAllowed);
        }
        if !access::can_act_for_client(caller, client.id) {
            return Err(SchedulingError::NotAuthorized);
        }

        // Steps 6-8 hold this professional's write lock: the availability and
        // conflict answers must still be true when the insert lands.
        let _guard = self.state.calendar_locks.acquire(professional.id).await;

        // **Step 6: The interval must sit inside one availability window**
        if !self
            .availability
            .interval_fits(&professional, interval.start, interval.end, auth_token)
            .await?
        {
            return Err(SchedulingError::ProfessionalUnavailable);
        }

        // **Step 7: No active booking may overlap the interval**
        let clashing = self
            .conflicts
            .active_overlapping(professional.id, &interval, None, auth_token)
            .await?;
        if !clashing.is_empty() {
            return Err(SchedulingError::TimeConflict);
        }

        // **Step 8: Persist as scheduled with the catalog price**
        let now = self.clock.now();
        let row = json!({
            "service_type": service.as_str(),
            "description": description,
            "start_at": wire_instant(&interval.start),
            "end_at": wire_instant(&interval.end),
            "price": service.base_price(),
            "status": AppointmentStatus::Scheduled,
            "professional_id": professional.id,
            "client_id": client.id,
            "created_at": wire_instant(&now),
            "updated_at": wire_instant(&now),
        });

        let created: Vec<Appointment> = self
            .rest
            .insert("/rest/v1/appointments", Some(auth_token), row)
            .await?;
        let appointment = created.into_iter().next().ok_or(StoreError::EmptyRepresentation)?;

        info!("Appointment {} scheduled", appointment.id);
        Ok(appointment)
    }

    pub async fn get(
        &self,
        appointment_id: Uuid,
        caller: &Caller,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Fetching appointment: {}", appointment_id);

        let appointment = self.find_appointment(appointment_id, auth_token).await?;
        let professional = self
            .availability
            .get_professional(appointment.professional_id, auth_token)
            .await?;

        if !access::can_view_appointment(caller, appointment.client_id, professional.user_id) {
            return Err(SchedulingError::NotAuthorized);
        }

        Ok(appointment)
    }

    /// Edits a scheduled booking. Only `description` and `start_at` move;
    /// the resulting state passes the same validation pipeline as a fresh
    /// booking, with this appointment excluded from the conflict query.
    #[instrument(skip(self, request, caller, auth_token), fields(appointment_id = %appointment_id))]
    pub async fn update(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        caller: &Caller,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Updating appointment: {}", appointment_id);

        let current = self.find_appointment(appointment_id, auth_token).await?;

        if !access::can_update_appointment(caller, current.client_id) {
            return Err(SchedulingError::NotAuthorized);
        }
        if current.status != AppointmentStatus::Scheduled {
            return Err(SchedulingError::UpdateNotAllowed(
                "only scheduled appointments can be edited".to_string(),
            ));
        }

        // The service type is fixed at booking time. Echoing the stored value
        // back is tolerated; anything else is not an edit.
        if let Some(ref raw) = request.service_type {
            let requested = ServiceType::parse(raw)
                .ok_or_else(|| SchedulingError::InvalidServiceType(raw.clone()))?;
            if requested != current.service_type {
                return Err(SchedulingError::UpdateNotAllowed(
                    "service type cannot be changed after booking".to_string(),
                ));
            }
        }

        let description = match request.description {
            Some(ref raw) => Some(clean_description(raw)?),
            None => None,
        };

        let start_at = request.start_at.unwrap_or(current.start_at);
        if start_at <= self.clock.now() {
            return Err(SchedulingError::InvalidDate);
        }
        let interval = TimeRange::span(start_at, current.service_type.duration());

        let professional = self
            .availability
            .get_professional(current.professional_id, auth_token)
            .await?;

        let _guard = self.state.calendar_locks.acquire(professional.id).await;

        if !self
            .availability
            .interval_fits(&professional, interval.start, interval.end, auth_token)
            .await?
        {
            return Err(SchedulingError::ProfessionalUnavailable);
        }

        let clashing = self
            .conflicts
            .active_overlapping(professional.id, &interval, Some(appointment_id), auth_token)
            .await?;
        if !clashing.is_empty() {
            return Err(SchedulingError::TimeConflict);
        }

        let mut fields = serde_json::Map::new();
        if let Some(description) = description {
            fields.insert("description".to_string(), json!(description));
        }
        fields.insert("start_at".to_string(), json!(wire_instant(&interval.start)));
        fields.insert("end_at".to_string(), json!(wire_instant(&interval.end)));
        fields.insert(
            "updated_at".to_string(),
            json!(wire_instant(&self.clock.now())),
        );

        let updated = self
            .persist_update(appointment_id, Value::Object(fields), auth_token)
            .await?;

        info!("Appointment {} updated", appointment_id);
        Ok(updated)
    }

    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        caller: &Caller,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.find_appointment(appointment_id, auth_token).await?;
        let professional = self
            .availability
            .get_professional(current.professional_id, auth_token)
            .await?;

        if !access::can_cancel_appointment(caller, current.client_id, professional.user_id) {
            return Err(SchedulingError::NotAuthorized);
        }
        if current.status.is_terminal() {
            return Err(SchedulingError::CancellationNotAllowed(current.status));
        }

        let cancelled = self
            .persist_update(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Cancelled,
                    "updated_at": wire_instant(&self.clock.now()),
                }),
                auth_token,
            )
            .await?;

        info!("Appointment {} cancelled, slot released", appointment_id);
        Ok(cancelled)
    }

    pub async fn set_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        caller: &Caller,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Moving appointment {} to {}", appointment_id, new_status);

        let current = self.find_appointment(appointment_id, auth_token).await?;
        let professional = self
            .availability
            .get_professional(current.professional_id, auth_token)
            .await?;

        if !access::can_set_status(caller, professional.user_id) {
            return Err(SchedulingError::NotAuthorized);
        }
        self.lifecycle.validate_transition(current.status, new_status)?;

        let updated = self
            .persist_update(
                appointment_id,
                json!({
                    "status": new_status,
                    "updated_at": wire_instant(&self.clock.now()),
                }),
                auth_token,
            )
            .await?;

        info!("Appointment {} moved to {}", appointment_id, new_status);
        Ok(updated)
    }

    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        page: &Page,
        caller: &Caller,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if !access::can_list_for_user(caller, client_id) {
            return Err(SchedulingError::NotAuthorized);
        }

        let path = format!(
            "/rest/v1/appointments?client_id=eq.{}&order=start_at.asc&limit={}&offset={}",
            client_id,
            page.limit(),
            page.offset()
        );
        let appointments = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(appointments)
    }

    pub async fn list_for_professional(
        &self,
        professional_id: Uuid,
        page: &Page,
        caller: &Caller,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let professional = self
            .availability
            .get_professional(professional_id, auth_token)
            .await?;
        if !access::can_list_for_professional(caller, professional.user_id) {
            return Err(SchedulingError::NotAuthorized);
        }

        let path = format!(
            "/rest/v1/appointments?professional_id=eq.{}&order=start_at.asc&limit={}&offset={}",
            professional_id,
            page.limit(),
            page.offset()
        );
        let appointments = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(appointments)
    }

    async fn find_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::NotFound(format!("appointment {}", appointment_id)))
    }

    async fn fetch_client(
        &self,
        client_id: Uuid,
        auth_token: &str,
    ) -> Result<UserRecord, SchedulingError> {
        let path = format!("/rest/v1/users?id=eq.{}", client_id);
        let result: Vec<UserRecord> = self
            .rest
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::NotFound(format!("client {}", client_id)))
    }

    async fn persist_update(
        &self,
        appointment_id: Uuid,
        fields: Value,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self.rest.update(&path, Some(auth_token), fields).await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmptyRepresentation.into())
    }
}

/// Trims the free-text description and bounds its length; the trimmed form
/// is what gets stored.
fn clean_description(raw: &str) -> Result<String, SchedulingError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(SchedulingError::InvalidArgument(
            "description must not be blank".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(SchedulingError::InvalidArgument(format!(
            "description must not exceed {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }

    Ok(trimmed.to_string())
}

fn wire_instant(instant: &chrono::DateTime<chrono::Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
