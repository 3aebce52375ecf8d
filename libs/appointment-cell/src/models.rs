// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use shared_utils::{date_math, CalendarUnit};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub appointment_type: AppointmentType,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostBreakdown>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reschedule_history: Vec<RescheduleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_info: Option<RecurrenceInfo>,
}

impl Appointment {
    pub fn scheduled_start_time(&self) -> DateTime<Utc> {
        self.appointment_date
    }

    /// Duration used for interval math; non-positive stored values fall back
    /// to `default_minutes`.
    pub fn effective_duration_minutes(&self, default_minutes: i32) -> i32 {
        if self.duration_minutes > 0 {
            self.duration_minutes
        } else {
            default_minutes
        }
    }

    /// `None` when the end would fall past chrono's representable range.
    pub fn scheduled_end_time(&self, default_minutes: i32) -> Option<DateTime<Utc>> {
        date_math::add_minutes(self.appointment_date, self.effective_duration_minutes(default_minutes))
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    Rescheduled,
    #[serde(alias = "no-show")]
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[default]
    #[serde(alias = "general", alias = "initial")]
    Consultation,

    #[serde(alias = "follow-up", alias = "followup")]
    FollowUp,

    #[serde(alias = "urgent")]
    Emergency,

    Procedure,

    #[serde(alias = "telehealth", alias = "virtual")]
    Telemedicine,
}

impl AppointmentType {
    /// Price multiplier applied to the doctor's consultation fee.
    pub fn cost_multiplier(&self) -> f64 {
        match self {
            AppointmentType::Consultation => 1.0,
            AppointmentType::FollowUp => 0.7,
            AppointmentType::Emergency => 1.5,
            AppointmentType::Procedure => 2.0,
            AppointmentType::Telemedicine => 0.8,
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::FollowUp => write!(f, "follow-up"),
            AppointmentType::Emergency => write!(f, "emergency"),
            AppointmentType::Procedure => write!(f, "procedure"),
            AppointmentType::Telemedicine => write!(f, "telemedicine"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleRecord {
    pub original_date: DateTime<Utc>,
    pub new_date: DateTime<Utc>,
    pub reason: String,
    pub rescheduled_at: DateTime<Utc>,
    pub rescheduled_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceInfo {
    pub series_id: String,
    pub occurrence_number: u32,
    pub is_recurring: bool,
}

/// A derived interval `[start, end)`; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

// ==============================================================================
// CONSUMED PROFILES
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default)]
    pub age_restrictions: Option<AgeRestrictions>,
    /// Percentage taken off the patient's share for returning patients.
    #[serde(default)]
    pub returning_patient_discount: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgeRestrictions {
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub date_of_birth: NaiveDate,
    /// `None` means unknown, which never earns the returning-patient discount.
    #[serde(default)]
    pub is_new_patient: Option<bool>,
    #[serde(default)]
    pub active_appointments: Option<Vec<ActiveAppointment>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAppointment {
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceCoverage {
    pub is_in_network: bool,
    pub coverage_percentage: f64,
    #[serde(default)]
    pub deductible_remaining: f64,
    #[serde(default)]
    pub copay: Option<f64>,
}

// ==============================================================================
// AVAILABILITY & VALIDATION
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub available: bool,
    pub conflicts: Vec<Appointment>,
    pub nearby_slots: Vec<TimeSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_available: Option<DateTime<Utc>>,
}

/// A proposed appointment, before it has an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub appointment_type: AppointmentType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    PastDate,
    AgeRestriction,
    InvalidDuration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: ValidationCode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn has_error(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|error| error.code == code)
    }
}

// ==============================================================================
// PRICING
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub base_cost: f64,
    pub insurance_coverage: f64,
    pub patient_responsibility: f64,
    pub breakdown: CostLineItems,
    /// Deductible pool left after this visit, when insurance applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible_remaining: Option<f64>,
    pub estimated_only: bool,
    pub currency: String,
}

/// Signed adjustments; reductions are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItems {
    pub consultation_fee: f64,
    pub type_adjustment: f64,
    pub duration_adjustment: f64,
    pub insurance_adjustment: f64,
    pub deductible_applied: f64,
    pub discounts: f64,
}

// ==============================================================================
// REMINDERS & NOTIFICATIONS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderPreferences {
    #[serde(default)]
    pub one_week_before: bool,
    #[serde(default)]
    pub one_day_before: bool,
    #[serde(default)]
    pub two_hours_before: bool,
}

impl ReminderPreferences {
    pub fn all() -> Self {
        Self {
            one_week_before: true,
            one_day_before: true,
            two_hours_before: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Scheduled,
    Sent,
    Failed,
}

/// Handed to the delivery system; nothing here sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentReminder {
    pub id: String,
    pub appointment_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub channel: NotificationChannel,
    pub message: String,
    pub status: ReminderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub channel: NotificationChannel,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

// ==============================================================================
// RESCHEDULING
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_slots: Option<Vec<TimeSlot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<Notification>>,
}

// ==============================================================================
// RECURRENCE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    pub fn calendar_unit(&self) -> CalendarUnit {
        match self {
            RecurrenceFrequency::Daily => CalendarUnit::Day,
            RecurrenceFrequency::Weekly => CalendarUnit::Week,
            RecurrenceFrequency::Monthly => CalendarUnit::Month,
            RecurrenceFrequency::Yearly => CalendarUnit::Year,
        }
    }
}

fn default_interval() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: RecurrenceFrequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub max_occurrences: Option<u32>,
}

// ==============================================================================
// FACADE RESULTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDecision {
    /// Present only when validation and availability both passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
    pub validation: ValidationResult,
    pub availability: AvailabilityCheck,
    pub reminders: Vec<AppointmentReminder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOccurrence {
    pub appointment: Appointment,
    pub availability: AvailabilityCheck,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Invalid appointment duration: {0} minutes")]
    InvalidDuration(i32),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}
