use std::env;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub scheduling: SchedulingConfig,
}

/// Tunables of the scheduling engine. `Default` matches the documented
/// business rules, so the engine works without any environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub workday_start_hour: u32,
    pub workday_end_hour: u32,
    pub nearby_search_days: i64,
    pub nearby_slot_hours: Vec<u32>,
    pub max_nearby_slots: usize,
    pub next_available_attempts: u32,
    pub max_advance_booking_days: i64,
    pub min_duration_minutes: i32,
    pub long_duration_minutes: i32,
    pub default_consultation_fee: f64,
    pub standard_duration_minutes: i32,
    pub default_max_occurrences: u32,
    pub currency: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            workday_start_hour: 9,
            workday_end_hour: 18,
            nearby_search_days: 7,
            nearby_slot_hours: vec![9, 14, 16],
            max_nearby_slots: 5,
            next_available_attempts: 100,
            max_advance_booking_days: 180,
            min_duration_minutes: 15,
            long_duration_minutes: 180,
            default_consultation_fee: 100.0,
            standard_duration_minutes: 30,
            default_max_occurrences: 52,
            currency: "USD".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SchedulingConfig::default();

        let mut scheduling = SchedulingConfig {
            workday_start_hour: parse_or(&lookup, "SCHEDULING_WORKDAY_START_HOUR", defaults.workday_start_hour),
            workday_end_hour: parse_or(&lookup, "SCHEDULING_WORKDAY_END_HOUR", defaults.workday_end_hour),
            nearby_search_days: parse_or(&lookup, "SCHEDULING_NEARBY_SEARCH_DAYS", defaults.nearby_search_days),
            nearby_slot_hours: defaults.nearby_slot_hours.clone(),
            max_nearby_slots: parse_or(&lookup, "SCHEDULING_MAX_NEARBY_SLOTS", defaults.max_nearby_slots),
            next_available_attempts: parse_or(&lookup, "SCHEDULING_NEXT_AVAILABLE_ATTEMPTS", defaults.next_available_attempts),
            max_advance_booking_days: parse_or(&lookup, "SCHEDULING_MAX_ADVANCE_DAYS", defaults.max_advance_booking_days),
            min_duration_minutes: parse_or(&lookup, "SCHEDULING_MIN_DURATION_MINUTES", defaults.min_duration_minutes),
            long_duration_minutes: parse_or(&lookup, "SCHEDULING_LONG_DURATION_MINUTES", defaults.long_duration_minutes),
            default_consultation_fee: parse_or(&lookup, "SCHEDULING_DEFAULT_CONSULTATION_FEE", defaults.default_consultation_fee),
            standard_duration_minutes: parse_or(&lookup, "SCHEDULING_STANDARD_DURATION_MINUTES", defaults.standard_duration_minutes),
            default_max_occurrences: parse_or(&lookup, "SCHEDULING_DEFAULT_MAX_OCCURRENCES", defaults.default_max_occurrences),
            currency: lookup("SCHEDULING_CURRENCY").unwrap_or_else(|| defaults.currency.clone()),
        };

        if !scheduling.has_valid_workday() {
            warn!(
                "Invalid working day {}:00-{}:00, falling back to {}:00-{}:00",
                scheduling.workday_start_hour,
                scheduling.workday_end_hour,
                defaults.workday_start_hour,
                defaults.workday_end_hour
            );
            scheduling.workday_start_hour = defaults.workday_start_hour;
            scheduling.workday_end_hour = defaults.workday_end_hour;
        }

        if scheduling.standard_duration_minutes <= 0 {
            warn!("SCHEDULING_STANDARD_DURATION_MINUTES must be positive, using default");
            scheduling.standard_duration_minutes = defaults.standard_duration_minutes;
        }

        Self {
            server_port: parse_or(&lookup, "SERVER_PORT", 3000),
            scheduling,
        }
    }
}

impl SchedulingConfig {
    pub fn has_valid_workday(&self) -> bool {
        self.workday_start_hour < self.workday_end_hour && self.workday_end_hour <= 24
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has unparsable value {:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
