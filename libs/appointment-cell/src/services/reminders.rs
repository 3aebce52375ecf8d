// libs/appointment-cell/src/services/reminders.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use shared_utils::Clock;

use crate::models::{
    Appointment, AppointmentReminder, NotificationChannel, ReminderPreferences, ReminderStatus,
};

struct ReminderOffset {
    suffix: &'static str,
    lead_time: Duration,
    channel: NotificationChannel,
    timeframe: &'static str,
}

#[derive(Debug, Clone)]
pub struct ReminderService {
    clock: Arc<dyn Clock>,
}

impl ReminderService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Reminder descriptors for every enabled offset that is still ahead of
    /// now. Channels are fixed per offset: email a week out, sms a day out,
    /// push two hours out.
    pub fn generate_reminders(
        &self,
        appointment: &Appointment,
        preferences: &ReminderPreferences,
    ) -> Vec<AppointmentReminder> {
        let now = self.clock.now();
        let start = appointment.scheduled_start_time();

        let offsets = [
            (
                preferences.one_week_before,
                ReminderOffset {
                    suffix: "1w",
                    lead_time: Duration::days(7),
                    channel: NotificationChannel::Email,
                    timeframe: "1 week",
                },
            ),
            (
                preferences.one_day_before,
                ReminderOffset {
                    suffix: "1d",
                    lead_time: Duration::days(1),
                    channel: NotificationChannel::Sms,
                    timeframe: "24 hours",
                },
            ),
            (
                preferences.two_hours_before,
                ReminderOffset {
                    suffix: "2h",
                    lead_time: Duration::hours(2),
                    channel: NotificationChannel::Push,
                    timeframe: "2 hours",
                },
            ),
        ];

        let reminders: Vec<AppointmentReminder> = offsets
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .filter_map(|(_, offset)| {
                let scheduled_for = start.checked_sub_signed(offset.lead_time)?;
                (scheduled_for > now).then(|| AppointmentReminder {
                    id: format!("{}-{}", appointment.id, offset.suffix),
                    appointment_id: appointment.id.clone(),
                    scheduled_for,
                    channel: offset.channel,
                    message: format!(
                        "Reminder: You have an appointment scheduled in {} on {}",
                        offset.timeframe,
                        format_appointment_time(start)
                    ),
                    status: ReminderStatus::Scheduled,
                })
            })
            .collect();

        debug!(
            "Generated {} reminders for appointment {}",
            reminders.len(),
            appointment.id
        );

        reminders
    }
}

pub(crate) fn format_appointment_time(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M UTC").to_string()
}
