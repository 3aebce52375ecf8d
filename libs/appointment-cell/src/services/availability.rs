// libs/appointment-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::{debug, warn};

use shared_config::SchedulingConfig;
use shared_utils::{date_math, Clock};

use crate::models::{Appointment, AvailabilityCheck, TimeSlot};

/// Conflict detection and open-slot search over a caller-supplied snapshot.
///
/// Every answer is only as fresh as the `existing_appointments` slice it was
/// given. Two concurrent bookings evaluated against the same snapshot can both
/// be reported available; the persistence layer has to enforce the final
/// guarantee (a doctor-scoped interval constraint or a transactional
/// check-and-insert) before an `available` verdict is trusted.
#[derive(Debug, Clone)]
pub struct AvailabilityService {
    config: SchedulingConfig,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(config: &SchedulingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: config.clone(),
            clock,
        }
    }

    /// Check whether `doctor_id` can take `[requested_start, requested_start + duration)`.
    pub fn check_availability(
        &self,
        doctor_id: &str,
        requested_start: DateTime<Utc>,
        duration_minutes: i32,
        existing_appointments: &[Appointment],
    ) -> AvailabilityCheck {
        self.check_availability_excluding(
            doctor_id,
            requested_start,
            duration_minutes,
            existing_appointments,
            None,
        )
    }

    /// Same as [`check_availability`](Self::check_availability) but ignores the
    /// appointment with `exclude_appointment_id`, so an appointment can be
    /// checked against everything except itself.
    pub fn check_availability_excluding(
        &self,
        doctor_id: &str,
        requested_start: DateTime<Utc>,
        duration_minutes: i32,
        existing_appointments: &[Appointment],
        exclude_appointment_id: Option<&str>,
    ) -> AvailabilityCheck {
        debug!(
            "Checking availability for doctor {} at {} ({} minutes, {} existing appointments)",
            doctor_id,
            requested_start,
            duration_minutes,
            existing_appointments.len()
        );

        let Some(requested_end) = date_math::add_minutes(requested_start, duration_minutes) else {
            warn!(
                "Requested interval for doctor {} at {} ({} minutes) is out of range",
                doctor_id, requested_start, duration_minutes
            );
            return AvailabilityCheck {
                available: false,
                conflicts: Vec::new(),
                nearby_slots: Vec::new(),
                next_available: None,
            };
        };

        let conflicts = self.find_conflicts(
            doctor_id,
            requested_start,
            requested_end,
            existing_appointments,
            exclude_appointment_id,
        );

        let nearby_slots = self.find_nearby_available_slots(
            doctor_id,
            requested_start,
            duration_minutes,
            existing_appointments,
            exclude_appointment_id,
        );

        let next_available = if conflicts.is_empty() {
            None
        } else {
            warn!(
                "Conflict detected for doctor {} - {} conflicting appointments",
                doctor_id,
                conflicts.len()
            );
            self.find_next_available_slot(
                doctor_id,
                requested_start,
                duration_minutes,
                existing_appointments,
                exclude_appointment_id,
            )
        };

        AvailabilityCheck {
            available: conflicts.is_empty(),
            conflicts,
            nearby_slots,
            next_available,
        }
    }

    /// Active same-doctor appointments overlapping `[requested_start, requested_end)`.
    pub fn find_conflicts(
        &self,
        doctor_id: &str,
        requested_start: DateTime<Utc>,
        requested_end: DateTime<Utc>,
        existing_appointments: &[Appointment],
        exclude_appointment_id: Option<&str>,
    ) -> Vec<Appointment> {
        self.blocking_appointments(doctor_id, existing_appointments, exclude_appointment_id)
            .filter(|apt| {
                intervals_overlap(
                    requested_start,
                    requested_end,
                    apt.scheduled_start_time(),
                    self.occupied_until(apt),
                )
            })
            .cloned()
            .collect()
    }

    /// A slot whose end cannot be represented is never free.
    fn is_slot_free(
        &self,
        doctor_id: &str,
        start: DateTime<Utc>,
        duration_minutes: i32,
        existing_appointments: &[Appointment],
        exclude_appointment_id: Option<&str>,
    ) -> bool {
        let Some(end) = date_math::add_minutes(start, duration_minutes) else {
            return false;
        };

        !self
            .blocking_appointments(doctor_id, existing_appointments, exclude_appointment_id)
            .any(|apt| intervals_overlap(start, end, apt.scheduled_start_time(), self.occupied_until(apt)))
    }

    // An existing appointment whose end overflows holds everything from its start on.
    fn occupied_until(&self, appointment: &Appointment) -> DateTime<Utc> {
        appointment
            .scheduled_end_time(self.config.standard_duration_minutes)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn blocking_appointments<'a>(
        &self,
        doctor_id: &'a str,
        existing_appointments: &'a [Appointment],
        exclude_appointment_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Appointment> + 'a {
        existing_appointments.iter().filter(move |apt| {
            apt.doctor_id == doctor_id
                && !apt.is_cancelled()
                && exclude_appointment_id.map_or(true, |excluded| apt.id != excluded)
        })
    }

    // ==============================================================================
    // SLOT SEARCH
    // ==============================================================================

    /// Canonical-hour slots on the days around the request, skipping the
    /// request day itself. Only future, conflict-free slots are kept.
    fn find_nearby_available_slots(
        &self,
        doctor_id: &str,
        requested_start: DateTime<Utc>,
        duration_minutes: i32,
        existing_appointments: &[Appointment],
        exclude_appointment_id: Option<&str>,
    ) -> Vec<TimeSlot> {
        let now = self.clock.now();
        let search_days = self.config.nearby_search_days;
        let requested_day = requested_start.date_naive();
        let mut slots = Vec::new();

        'days: for day_offset in -search_days..=search_days {
            if day_offset == 0 {
                continue;
            }

            let Some(day) = Duration::try_days(day_offset)
                .and_then(|offset| requested_day.checked_add_signed(offset))
            else {
                continue;
            };

            for &hour in &self.config.nearby_slot_hours {
                let Some(start) = date_math::at_hour(day, hour) else {
                    continue;
                };

                if start <= now {
                    continue;
                }

                let Some(end) = date_math::add_minutes(start, duration_minutes) else {
                    continue;
                };

                if self.is_slot_free(doctor_id, start, duration_minutes, existing_appointments, exclude_appointment_id) {
                    slots.push(TimeSlot {
                        start,
                        end,
                        available: true,
                    });

                    if slots.len() >= self.config.max_nearby_slots {
                        break 'days;
                    }
                }
            }
        }

        debug!("Found {} nearby slots for doctor {}", slots.len(), doctor_id);
        slots
    }

    /// Hourly scan from the hour after the request, confined to the working
    /// day. Returns the first conflict-free hour within the attempt budget.
    fn find_next_available_slot(
        &self,
        doctor_id: &str,
        after: DateTime<Utc>,
        duration_minutes: i32,
        existing_appointments: &[Appointment],
        exclude_appointment_id: Option<&str>,
    ) -> Option<DateTime<Utc>> {
        let first = date_math::truncate_to_hour(after.checked_add_signed(Duration::hours(1))?)?;
        let mut candidate = self.clamp_to_working_hours(first)?;

        for _ in 0..self.config.next_available_attempts {
            if self.is_slot_free(doctor_id, candidate, duration_minutes, existing_appointments, exclude_appointment_id) {
                debug!("Next available slot for doctor {} is {}", doctor_id, candidate);
                return Some(candidate);
            }

            candidate = self.clamp_to_working_hours(candidate.checked_add_signed(Duration::hours(1))?)?;
        }

        warn!(
            "No free slot for doctor {} within {} hourly attempts after {}",
            doctor_id, self.config.next_available_attempts, after
        );
        None
    }

    /// Hours at or past the end of the working day roll to the next day's
    /// opening hour; hours before opening move to the same day's opening hour.
    fn clamp_to_working_hours(&self, candidate: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let day = candidate.date_naive();

        if candidate.hour() >= self.config.workday_end_hour {
            date_math::at_hour(day.succ_opt()?, self.config.workday_start_hour)
        } else if candidate.hour() < self.config.workday_start_hour {
            date_math::at_hour(day, self.config.workday_start_hour)
        } else {
            Some(candidate)
        }
    }
}

/// Three-case overlap test: the new interval starts inside the existing one,
/// ends inside it, or fully contains it.
pub fn intervals_overlap(
    requested_start: DateTime<Utc>,
    requested_end: DateTime<Utc>,
    existing_start: DateTime<Utc>,
    existing_end: DateTime<Utc>,
) -> bool {
    (requested_start >= existing_start && requested_start < existing_end)
        || (requested_end > existing_start && requested_end <= existing_end)
        || (requested_start <= existing_start && requested_end >= existing_end)
}
