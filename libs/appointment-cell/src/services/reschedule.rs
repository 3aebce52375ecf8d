// libs/appointment-cell/src/services/reschedule.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use shared_config::SchedulingConfig;
use shared_utils::Clock;

use crate::models::{
    Appointment, AppointmentStatus, Notification, NotificationChannel, RescheduleRecord,
    RescheduleResult,
};
use crate::services::availability::AvailabilityService;
use crate::services::reminders::format_appointment_time;

const RESCHEDULED_BY_SYSTEM: &str = "system";

#[derive(Debug, Clone)]
pub struct RescheduleService {
    availability: AvailabilityService,
    config: SchedulingConfig,
    clock: Arc<dyn Clock>,
}

impl RescheduleService {
    pub fn new(config: &SchedulingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            availability: AvailabilityService::new(config, Arc::clone(&clock)),
            config: config.clone(),
            clock,
        }
    }

    /// Move `original` to `new_date` if the doctor is free there.
    ///
    /// `original` is never modified: on success the superseding version is
    /// returned and persisting the transition is the caller's job. The
    /// appointment being moved does not conflict with itself. The same
    /// snapshot caveat as [`AvailabilityService`] applies.
    pub fn reschedule(
        &self,
        original: &Appointment,
        new_date: DateTime<Utc>,
        reason: &str,
        existing_appointments: &[Appointment],
    ) -> RescheduleResult {
        let duration = original.effective_duration_minutes(self.config.standard_duration_minutes);

        let availability = self.availability.check_availability_excluding(
            &original.doctor_id,
            new_date,
            duration,
            existing_appointments,
            Some(&original.id),
        );

        if !availability.available {
            warn!(
                "Reschedule of appointment {} to {} rejected: {} conflicts",
                original.id,
                new_date,
                availability.conflicts.len()
            );
            return RescheduleResult {
                success: false,
                appointment: None,
                error: Some("Requested time slot is not available".to_string()),
                alternative_slots: Some(availability.nearby_slots),
                notifications: None,
            };
        }

        let mut rescheduled = original.clone();
        rescheduled.appointment_date = new_date;
        rescheduled.status = AppointmentStatus::Rescheduled;
        rescheduled.reschedule_history.push(RescheduleRecord {
            original_date: original.appointment_date,
            new_date,
            reason: reason.to_string(),
            rescheduled_at: self.clock.now(),
            rescheduled_by: RESCHEDULED_BY_SYSTEM.to_string(),
        });

        let notifications = self.generate_reschedule_notifications(original, &rescheduled);

        info!(
            "Appointment {} rescheduled from {} to {}",
            original.id, original.appointment_date, new_date
        );

        RescheduleResult {
            success: true,
            appointment: Some(rescheduled),
            error: None,
            alternative_slots: None,
            notifications: Some(notifications),
        }
    }

    fn generate_reschedule_notifications(
        &self,
        original: &Appointment,
        rescheduled: &Appointment,
    ) -> Vec<Notification> {
        let from = format_appointment_time(original.appointment_date);
        let to = format_appointment_time(rescheduled.appointment_date);

        vec![
            Notification {
                channel: NotificationChannel::Email,
                recipient: "patient".to_string(),
                subject: Some("Appointment Rescheduled".to_string()),
                message: format!("Your appointment has been rescheduled from {} to {}", from, to),
            },
            Notification {
                channel: NotificationChannel::Sms,
                recipient: "patient".to_string(),
                subject: None,
                message: format!("Appointment rescheduled to {}", to),
            },
        ]
    }
}
