// libs/appointment-cell/src/services/recurrence.rs
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use shared_config::SchedulingConfig;
use shared_utils::date_math;

use crate::models::{Appointment, RecurrenceInfo, RecurrenceRule};

#[derive(Debug, Clone)]
pub struct RecurrenceService {
    config: SchedulingConfig,
}

impl RecurrenceService {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Materialize the series described by `rule`, starting at the base
    /// appointment's date and ending at `end_date` (inclusive) or after
    /// `max_occurrences`, whichever comes first.
    ///
    /// Each occurrence is computed from the base date rather than from the
    /// previous occurrence, so a monthly series started on the 31st returns to
    /// the 31st after shorter months. No conflict checking happens here.
    pub fn create_recurring_appointments(
        &self,
        base: &Appointment,
        rule: &RecurrenceRule,
        end_date: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let interval = if rule.interval == 0 {
            warn!("Recurrence interval of 0 for series {}, using 1", base.id);
            1
        } else {
            rule.interval
        };

        let max_occurrences = rule
            .max_occurrences
            .filter(|max| *max > 0)
            .unwrap_or(self.config.default_max_occurrences);

        let unit = rule.frequency.calendar_unit();
        let mut appointments = Vec::new();

        for index in 0..max_occurrences {
            let Some(occurrence_date) = index
                .checked_mul(interval)
                .and_then(|steps| date_math::add_units(base.appointment_date, unit, steps))
            else {
                warn!("Recurrence for series {} overflowed after {} occurrences", base.id, index);
                break;
            };

            if occurrence_date > end_date {
                break;
            }

            let mut occurrence = base.clone();
            occurrence.id = format!("{}-{}", base.id, index);
            occurrence.appointment_date = occurrence_date;
            occurrence.recurrence_info = Some(RecurrenceInfo {
                series_id: base.id.clone(),
                occurrence_number: index + 1,
                is_recurring: true,
            });
            appointments.push(occurrence);
        }

        debug!(
            "Expanded series {} into {} occurrences ({:?} every {})",
            base.id,
            appointments.len(),
            rule.frequency,
            interval
        );

        appointments
    }
}
