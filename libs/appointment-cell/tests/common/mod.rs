// Shared fixtures for the appointment-cell integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use appointment_cell::models::{
    Appointment, AppointmentStatus, AppointmentType, BookingRequest, Doctor, Patient,
};
use appointment_cell::services::AppointmentScheduler;
use shared_config::SchedulingConfig;
use shared_utils::{Clock, FixedClock};

/// Monday 2031-03-03 10:00 UTC; every fixture clock is frozen here.
pub fn now() -> DateTime<Utc> {
    utc(2031, 3, 3, 10, 0)
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at(now()))
}

pub fn scheduler() -> AppointmentScheduler {
    AppointmentScheduler::with_clock(&SchedulingConfig::default(), clock())
}

pub fn appointment(id: &str, doctor_id: &str, start: DateTime<Utc>, duration_minutes: i32) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient_id: "patient-1".to_string(),
        doctor_id: doctor_id.to_string(),
        appointment_date: start,
        duration_minutes,
        appointment_type: AppointmentType::Consultation,
        status: AppointmentStatus::Confirmed,
        cost: None,
        reschedule_history: Vec::new(),
        recurrence_info: None,
    }
}

pub fn doctor(id: &str) -> Doctor {
    Doctor {
        id: id.to_string(),
        consultation_fee: Some(100.0),
        age_restrictions: None,
        returning_patient_discount: None,
    }
}

pub fn patient_born(date_of_birth: NaiveDate) -> Patient {
    Patient {
        id: "patient-1".to_string(),
        date_of_birth,
        is_new_patient: Some(true),
        active_appointments: None,
    }
}

pub fn adult_patient() -> Patient {
    patient_born(NaiveDate::from_ymd_opt(1990, 5, 20).unwrap())
}

pub fn booking(doctor_id: &str, start: DateTime<Utc>, duration_minutes: i32) -> BookingRequest {
    BookingRequest {
        patient_id: "patient-1".to_string(),
        doctor_id: doctor_id.to_string(),
        appointment_date: start,
        duration_minutes,
        appointment_type: AppointmentType::Consultation,
    }
}
