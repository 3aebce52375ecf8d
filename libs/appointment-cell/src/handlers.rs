// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookingRequest, Doctor, InsuranceCoverage,
    Patient, RecurrenceRule, ReminderPreferences,
};
use crate::services::scheduler::AppointmentScheduler;

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::InvalidStatusTransition { .. } => AppError::Conflict(message),
            AppointmentError::InvalidDuration(_) | AppointmentError::InvalidTime(_) => {
                AppError::BadRequest(message)
            }
        }
    }
}

fn scheduler(state: &AppConfig) -> AppointmentScheduler {
    AppointmentScheduler::new(&state.scheduling)
}

// ==============================================================================
// REQUEST BODIES
// ==============================================================================
//
// Every request carries the appointment snapshot it is evaluated against;
// the service keeps nothing between calls.

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub doctor_id: String,
    pub requested_start: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub existing_appointments: Vec<Appointment>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateBookingRequest {
    pub candidate: BookingRequest,
    pub patient: Patient,
    pub doctor: Doctor,
}

#[derive(Debug, Deserialize)]
pub struct CostRequest {
    pub appointment: Appointment,
    pub doctor: Doctor,
    pub patient: Patient,
    #[serde(default)]
    pub insurance: Option<InsuranceCoverage>,
}

#[derive(Debug, Deserialize)]
pub struct RemindersRequest {
    pub appointment: Appointment,
    #[serde(default)]
    pub preferences: ReminderPreferences,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub original: Appointment,
    pub new_date: DateTime<Utc>,
    pub reason: String,
    #[serde(default)]
    pub existing_appointments: Vec<Appointment>,
}

#[derive(Debug, Deserialize)]
pub struct RecurringRequest {
    pub base: Appointment,
    pub rule: RecurrenceRule,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesPlanRequest {
    pub base: Appointment,
    pub rule: RecurrenceRule,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub existing_appointments: Vec<Appointment>,
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub booking: BookingRequest,
    pub patient: Patient,
    pub doctor: Doctor,
    #[serde(default)]
    pub existing_appointments: Vec<Appointment>,
    #[serde(default)]
    pub insurance: Option<InsuranceCoverage>,
    #[serde(default)]
    pub reminder_preferences: ReminderPreferences,
}

#[derive(Debug, Deserialize)]
pub struct StatusTransitionRequest {
    pub appointment: Appointment,
    pub new_status: AppointmentStatus,
}

// ==============================================================================
// HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let scheduler = scheduler(&state);
    let duration = scheduler.normalize_duration(request.duration_minutes)?;
    scheduler.interval_end(request.requested_start, duration)?;

    let check = scheduler.check_availability(
        &request.doctor_id,
        request.requested_start,
        duration,
        &request.existing_appointments,
    );

    Ok(Json(serde_json::to_value(check)?))
}

pub async fn validate_booking(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ValidateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let scheduler = scheduler(&state);
    scheduler.interval_end(request.candidate.appointment_date, request.candidate.duration_minutes)?;

    let result = scheduler.validate_booking(&request.candidate, &request.patient, &request.doctor);
    Ok(Json(serde_json::to_value(result)?))
}

pub async fn calculate_cost(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CostRequest>,
) -> Result<Json<Value>, AppError> {
    let cost = scheduler(&state).calculate_cost(
        &request.appointment,
        &request.doctor,
        &request.patient,
        request.insurance.as_ref(),
    );
    Ok(Json(serde_json::to_value(cost)?))
}

pub async fn generate_reminders(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RemindersRequest>,
) -> Result<Json<Value>, AppError> {
    let reminders = scheduler(&state).generate_reminders(&request.appointment, &request.preferences);
    Ok(Json(json!({
        "reminders": reminders,
        "count": reminders.len(),
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    if request.reason.trim().is_empty() {
        return Err(AppError::BadRequest("A reschedule reason is required".to_string()));
    }

    // Stored durations are not re-validated; the engine falls back to the
    // standard length for them.
    let scheduler = scheduler(&state);
    let duration = request
        .original
        .effective_duration_minutes(state.scheduling.standard_duration_minutes);
    scheduler.interval_end(request.new_date, duration)?;

    let result = scheduler.reschedule(
        &request.original,
        request.new_date,
        &request.reason,
        &request.existing_appointments,
    );
    Ok(Json(serde_json::to_value(result)?))
}

pub async fn create_recurring_appointments(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RecurringRequest>,
) -> Result<Json<Value>, AppError> {
    if request.end_date < request.base.appointment_date {
        return Err(AppointmentError::InvalidTime(format!(
            "end date {} is before the first occurrence {}",
            request.end_date, request.base.appointment_date
        ))
        .into());
    }

    let appointments =
        scheduler(&state).create_recurring_appointments(&request.base, &request.rule, request.end_date);
    debug!("Returning {} recurring appointments", appointments.len());

    Ok(Json(json!({
        "appointments": appointments,
        "count": appointments.len(),
    })))
}

pub async fn plan_series(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SeriesPlanRequest>,
) -> Result<Json<Value>, AppError> {
    let occurrences = scheduler(&state).plan_series(
        &request.base,
        &request.rule,
        request.end_date,
        &request.existing_appointments,
    );
    let conflicting = occurrences
        .iter()
        .filter(|occurrence| !occurrence.availability.available)
        .count();

    Ok(Json(json!({
        "occurrences": occurrences,
        "count": occurrences.len(),
        "conflicting": conflicting,
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookRequest>,
) -> Result<Json<Value>, AppError> {
    let scheduler = scheduler(&state);
    let duration = scheduler.normalize_duration(request.booking.duration_minutes)?;
    scheduler.interval_end(request.booking.appointment_date, duration)?;

    let decision = scheduler.book(
        &request.booking,
        &request.patient,
        &request.doctor,
        &request.existing_appointments,
        request.insurance.as_ref(),
        &request.reminder_preferences,
    );
    Ok(Json(serde_json::to_value(decision)?))
}

pub async fn transition_status(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<StatusTransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = scheduler(&state).transition_status(&request.appointment, request.new_status)?;
    Ok(Json(serde_json::to_value(updated)?))
}
