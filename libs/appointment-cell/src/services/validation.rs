// libs/appointment-cell/src/services/validation.rs
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use shared_config::SchedulingConfig;
use shared_utils::{date_math, Clock};

use crate::models::{
    BookingRequest, Doctor, Patient, ValidationCode, ValidationError, ValidationResult,
};

/// Business rules for a proposed booking. Each rule is evaluated on its own;
/// errors block the booking, warnings do not.
#[derive(Debug, Clone)]
pub struct BookingValidationService {
    config: SchedulingConfig,
    clock: Arc<dyn Clock>,
}

impl BookingValidationService {
    pub fn new(config: &SchedulingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: config.clone(),
            clock,
        }
    }

    pub fn validate_booking(
        &self,
        candidate: &BookingRequest,
        patient: &Patient,
        doctor: &Doctor,
    ) -> ValidationResult {
        debug!(
            "Validating booking for patient {} with doctor {} at {}",
            candidate.patient_id, candidate.doctor_id, candidate.appointment_date
        );

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.check_date(candidate, &mut errors, &mut warnings);
        self.check_age(patient, doctor, &mut errors);
        self.check_duration(candidate, &mut errors, &mut warnings);
        self.check_duplicate(candidate, patient, &mut warnings);

        let valid = errors.is_empty();
        info!(
            "Booking validation for patient {}: valid={}, {} errors, {} warnings",
            candidate.patient_id,
            valid,
            errors.len(),
            warnings.len()
        );

        ValidationResult {
            valid,
            errors,
            warnings,
        }
    }

    fn check_date(
        &self,
        candidate: &BookingRequest,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<String>,
    ) {
        let now = self.clock.now();

        if candidate.appointment_date <= now {
            errors.push(ValidationError {
                field: "appointment_date".to_string(),
                message: "Appointment must be scheduled for future date".to_string(),
                code: ValidationCode::PastDate,
            });
        }

        // A horizon past the calendar's end never triggers the warning.
        let max_days = self.config.max_advance_booking_days;
        let horizon = Duration::try_days(max_days).and_then(|days| now.checked_add_signed(days));
        if horizon.is_some_and(|horizon| candidate.appointment_date > horizon) {
            warnings.push(format!("Appointment is more than {} days in advance", max_days));
        }
    }

    fn check_age(&self, patient: &Patient, doctor: &Doctor, errors: &mut Vec<ValidationError>) {
        let Some(restrictions) = doctor.age_restrictions else {
            return;
        };

        let age = date_math::whole_years_between(patient.date_of_birth, self.clock.now().date_naive());

        if let Some(min) = restrictions.min {
            if age < min {
                errors.push(ValidationError {
                    field: "patient_id".to_string(),
                    message: format!("Patient age ({}) below doctor's minimum ({})", age, min),
                    code: ValidationCode::AgeRestriction,
                });
            }
        }

        if let Some(max) = restrictions.max {
            if age > max {
                errors.push(ValidationError {
                    field: "patient_id".to_string(),
                    message: format!("Patient age ({}) above doctor's maximum ({})", age, max),
                    code: ValidationCode::AgeRestriction,
                });
            }
        }
    }

    fn check_duration(
        &self,
        candidate: &BookingRequest,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<String>,
    ) {
        if candidate.duration_minutes < self.config.min_duration_minutes {
            errors.push(ValidationError {
                field: "duration_minutes".to_string(),
                message: format!(
                    "Appointment duration must be at least {} minutes",
                    self.config.min_duration_minutes
                ),
                code: ValidationCode::InvalidDuration,
            });
        }

        if candidate.duration_minutes > self.config.long_duration_minutes {
            warnings.push(format!(
                "Appointment duration exceeds {} minutes",
                self.config.long_duration_minutes
            ));
        }
    }

    // Exact doctor + timestamp match only; overlap is the availability check's job.
    fn check_duplicate(&self, candidate: &BookingRequest, patient: &Patient, warnings: &mut Vec<String>) {
        let Some(active) = &patient.active_appointments else {
            return;
        };

        let duplicate = active.iter().any(|apt| {
            apt.doctor_id == candidate.doctor_id && apt.appointment_date == candidate.appointment_date
        });

        if duplicate {
            warnings.push("Patient already has appointment with this doctor at same time".to_string());
        }
    }
}
