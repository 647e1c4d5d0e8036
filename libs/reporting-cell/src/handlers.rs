use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use booking_cell::models::Appointment;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::pagination::{Page, PageQuery};
use shared_utils::state::AppState;

use crate::models::{ExportQuery, ReportingError};
use crate::services::renderer::RendererClient;
use crate::services::views::{export_period, ReportingService};

#[axum::debug_handler]
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ReportingService::new(&state.config);
    let page = validated_page(&query)?;

    let appointments = service
        .my_bookings(&user.caller(), &page, auth.token())
        .await
        .map_err(map_reporting_error)?;

    Ok(view_response(appointments, &page))
}

#[axum::debug_handler]
pub async fn my_future_bookings(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ReportingService::new(&state.config);
    let page = validated_page(&query)?;

    let appointments = service
        .my_future_bookings(&user.caller(), &page, auth.token())
        .await
        .map_err(map_reporting_error)?;

    Ok(view_response(appointments, &page))
}

#[axum::debug_handler]
pub async fn my_past_bookings(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ReportingService::new(&state.config);
    let page = validated_page(&query)?;

    let appointments = service
        .my_past_bookings(&user.caller(), &page, auth.token())
        .await
        .map_err(map_reporting_error)?;

    Ok(view_response(appointments, &page))
}

#[axum::debug_handler]
pub async fn my_future_engagements(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ReportingService::new(&state.config);
    let page = validated_page(&query)?;

    let appointments = service
        .my_future_engagements(&user.caller(), &page, auth.token())
        .await
        .map_err(map_reporting_error)?;

    Ok(view_response(appointments, &page))
}

#[axum::debug_handler]
pub async fn my_past_engagements(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ReportingService::new(&state.config);
    let page = validated_page(&query)?;

    let appointments = service
        .my_past_engagements(&user.caller(), &page, auth.token())
        .await
        .map_err(map_reporting_error)?;

    Ok(view_response(appointments, &page))
}

/// Streams the rendered PDF for the caller's records in the given period.
#[axum::debug_handler]
pub async fn export_appointments(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let year = query.year.ok_or(AppError::BadRequest {
        code: "invalid_argument",
        message: "year is required".to_string(),
    })?;
    let period = export_period(year, query.month).map_err(map_reporting_error)?;

    let service = ReportingService::new(&state.config);
    let records = service
        .export_records(&user.caller(), &period, auth.token())
        .await
        .map_err(map_reporting_error)?;

    let renderer = RendererClient::new(&state.config);
    let pdf = renderer.render(&records).await.map_err(map_reporting_error)?;

    let filename = match query.month {
        Some(month) => format!("appointments-{}-{:02}.pdf", year, month),
        None => format!("appointments-{}.pdf", year),
    };
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, pdf).into_response())
}

fn validated_page(query: &PageQuery) -> Result<Page, AppError> {
    Page::from_query(query).map_err(|e| map_reporting_error(e.into()))
}

fn view_response(appointments: Vec<Appointment>, page: &Page) -> Json<Value> {
    Json(json!({
        "appointments": appointments,
        "page": page.number(),
        "size": page.size(),
        "count": appointments.len()
    }))
}

fn map_reporting_error(err: ReportingError) -> AppError {
    let code = err.code();
    match &err {
        ReportingError::InvalidArgument(_) => AppError::BadRequest {
            code,
            message: err.to_string(),
        },
        ReportingError::NotFound(_) => AppError::NotFound(err.to_string()),
        ReportingError::RendererUnavailable(_) => AppError::ExternalService {
            code,
            message: err.to_string(),
        },
        ReportingError::Transient(msg) => AppError::Transient(msg.clone()),
        ReportingError::Internal(msg) => AppError::Internal(msg.clone()),
    }
}
