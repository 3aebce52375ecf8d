// libs/appointment-cell/src/services/scheduler.rs
//
// Entry point that wires the scheduling services together over one config
// and one clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use shared_config::SchedulingConfig;
use shared_utils::{date_math, Clock, SystemClock};

use crate::models::{
    Appointment, AppointmentError, AppointmentReminder, AppointmentStatus, AvailabilityCheck,
    BookingDecision, BookingRequest, CostBreakdown, Doctor, InsuranceCoverage, Patient,
    RecurrenceRule, ReminderPreferences, RescheduleResult, SeriesOccurrence, ValidationResult,
};
use crate::services::availability::AvailabilityService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::pricing::PricingService;
use crate::services::recurrence::RecurrenceService;
use crate::services::reminders::ReminderService;
use crate::services::reschedule::RescheduleService;
use crate::services::validation::BookingValidationService;

/// Stateless scheduling decisions over caller-supplied snapshots.
///
/// # Concurrency contract
///
/// Nothing here locks or persists. Every availability verdict describes the
/// `existing_appointments` slice passed in, not the live calendar, so two
/// concurrent bookings checked against the same snapshot can both succeed.
/// Callers must back a positive verdict with a guarantee in their store (a
/// doctor-scoped interval constraint or a transactional check-and-insert)
/// before treating a slot as taken.
#[derive(Debug, Clone)]
pub struct AppointmentScheduler {
    standard_duration_minutes: i32,
    availability: AvailabilityService,
    validation: BookingValidationService,
    pricing: PricingService,
    reminders: ReminderService,
    reschedule: RescheduleService,
    recurrence: RecurrenceService,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentScheduler {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &SchedulingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            availability: AvailabilityService::new(config, Arc::clone(&clock)),
            validation: BookingValidationService::new(config, Arc::clone(&clock)),
            pricing: PricingService::new(config),
            reminders: ReminderService::new(Arc::clone(&clock)),
            reschedule: RescheduleService::new(config, clock),
            recurrence: RecurrenceService::new(config),
            lifecycle: AppointmentLifecycleService::new(),
            standard_duration_minutes: config.standard_duration_minutes,
        }
    }

    // ==============================================================================
    // CORE OPERATIONS
    // ==============================================================================

    #[instrument(skip_all, fields(doctor_id = %doctor_id, requested_start = %requested_start))]
    pub fn check_availability(
        &self,
        doctor_id: &str,
        requested_start: DateTime<Utc>,
        duration_minutes: i32,
        existing_appointments: &[Appointment],
    ) -> AvailabilityCheck {
        self.availability
            .check_availability(doctor_id, requested_start, duration_minutes, existing_appointments)
    }

    #[instrument(skip_all, fields(patient_id = %candidate.patient_id, doctor_id = %candidate.doctor_id))]
    pub fn validate_booking(
        &self,
        candidate: &BookingRequest,
        patient: &Patient,
        doctor: &Doctor,
    ) -> ValidationResult {
        self.validation.validate_booking(candidate, patient, doctor)
    }

    #[instrument(skip_all, fields(appointment_id = %appointment.id))]
    pub fn calculate_cost(
        &self,
        appointment: &Appointment,
        doctor: &Doctor,
        patient: &Patient,
        insurance: Option<&InsuranceCoverage>,
    ) -> CostBreakdown {
        self.pricing.calculate_cost(appointment, doctor, patient, insurance)
    }

    pub fn generate_reminders(
        &self,
        appointment: &Appointment,
        preferences: &ReminderPreferences,
    ) -> Vec<AppointmentReminder> {
        self.reminders.generate_reminders(appointment, preferences)
    }

    #[instrument(skip_all, fields(appointment_id = %original.id, new_date = %new_date))]
    pub fn reschedule(
        &self,
        original: &Appointment,
        new_date: DateTime<Utc>,
        reason: &str,
        existing_appointments: &[Appointment],
    ) -> RescheduleResult {
        self.reschedule.reschedule(original, new_date, reason, existing_appointments)
    }

    #[instrument(skip_all, fields(series_id = %base.id, frequency = ?rule.frequency))]
    pub fn create_recurring_appointments(
        &self,
        base: &Appointment,
        rule: &RecurrenceRule,
        end_date: DateTime<Utc>,
    ) -> Vec<Appointment> {
        self.recurrence.create_recurring_appointments(base, rule, end_date)
    }

    // ==============================================================================
    // COMPOSED OPERATIONS
    // ==============================================================================

    /// Validate and availability-check a request; when both pass, shape the
    /// new appointment and annotate it with its cost estimate and reminders.
    #[instrument(skip_all, fields(patient_id = %request.patient_id, doctor_id = %request.doctor_id))]
    pub fn book(
        &self,
        request: &BookingRequest,
        patient: &Patient,
        doctor: &Doctor,
        existing_appointments: &[Appointment],
        insurance: Option<&InsuranceCoverage>,
        preferences: &ReminderPreferences,
    ) -> BookingDecision {
        let validation = self.validation.validate_booking(request, patient, doctor);
        let availability = self.availability.check_availability(
            &request.doctor_id,
            request.appointment_date,
            request.duration_minutes,
            existing_appointments,
        );

        if !validation.valid || !availability.available {
            info!(
                "Booking refused for patient {}: valid={}, available={}",
                request.patient_id, validation.valid, availability.available
            );
            return BookingDecision {
                appointment: None,
                validation,
                availability,
                reminders: Vec::new(),
            };
        }

        let mut appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            patient_id: request.patient_id.clone(),
            doctor_id: request.doctor_id.clone(),
            appointment_date: request.appointment_date,
            duration_minutes: request.duration_minutes,
            appointment_type: request.appointment_type,
            status: AppointmentStatus::Scheduled,
            cost: None,
            reschedule_history: Vec::new(),
            recurrence_info: None,
        };
        appointment.cost = Some(self.pricing.calculate_cost(&appointment, doctor, patient, insurance));
        let reminders = self.reminders.generate_reminders(&appointment, preferences);

        info!(
            "Booking accepted: appointment {} for patient {} with doctor {}",
            appointment.id, appointment.patient_id, appointment.doctor_id
        );

        BookingDecision {
            appointment: Some(appointment),
            validation,
            availability,
            reminders,
        }
    }

    /// Expand a series and check each occurrence against the snapshot.
    #[instrument(skip_all, fields(series_id = %base.id))]
    pub fn plan_series(
        &self,
        base: &Appointment,
        rule: &RecurrenceRule,
        end_date: DateTime<Utc>,
        existing_appointments: &[Appointment],
    ) -> Vec<SeriesOccurrence> {
        self.recurrence
            .create_recurring_appointments(base, rule, end_date)
            .into_iter()
            .map(|appointment| {
                let availability = self.availability.check_availability(
                    &appointment.doctor_id,
                    appointment.appointment_date,
                    appointment.effective_duration_minutes(self.standard_duration_minutes),
                    existing_appointments,
                );
                SeriesOccurrence {
                    appointment,
                    availability,
                }
            })
            .collect()
    }

    /// Copy of `appointment` moved to `new_status`, if the state machine allows it.
    pub fn transition_status(
        &self,
        appointment: &Appointment,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        self.lifecycle
            .validate_status_transition(&appointment.status, &new_status)?;

        let mut updated = appointment.clone();
        updated.status = new_status;
        Ok(updated)
    }

    /// Reject durations the interval math cannot represent.
    pub fn normalize_duration(&self, duration_minutes: i32) -> Result<i32, AppointmentError> {
        if duration_minutes <= 0 {
            return Err(AppointmentError::InvalidDuration(duration_minutes));
        }
        Ok(duration_minutes)
    }

    /// End of `[start, start + duration)`, or `InvalidTime` when it falls past
    /// the last representable instant.
    pub fn interval_end(
        &self,
        start: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<DateTime<Utc>, AppointmentError> {
        date_math::add_minutes(start, duration_minutes).ok_or_else(|| {
            AppointmentError::InvalidTime(format!(
                "{} plus {} minutes is out of range",
                start, duration_minutes
            ))
        })
    }
}
