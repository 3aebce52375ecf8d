// libs/appointment-cell/tests/recurrence_test.rs

mod common;

use appointment_cell::models::{RecurrenceFrequency, RecurrenceRule};

use common::{appointment, scheduler, utc};

fn rule(frequency: RecurrenceFrequency, interval: u32, max_occurrences: Option<u32>) -> RecurrenceRule {
    RecurrenceRule {
        frequency,
        interval,
        max_occurrences,
    }
}

#[test]
fn test_biweekly_series_until_end_date() {
    let base = appointment("series", "doc-1", utc(2032, 1, 1, 9, 0), 30);

    let series = scheduler().create_recurring_appointments(
        &base,
        &rule(RecurrenceFrequency::Weekly, 2, None),
        utc(2032, 3, 1, 0, 0),
    );

    let dates: Vec<_> = series.iter().map(|apt| apt.appointment_date).collect();
    assert_eq!(
        dates,
        vec![
            utc(2032, 1, 1, 9, 0),
            utc(2032, 1, 15, 9, 0),
            utc(2032, 1, 29, 9, 0),
            utc(2032, 2, 12, 9, 0),
            utc(2032, 2, 26, 9, 0),
        ]
    );
}

#[test]
fn test_occurrences_carry_series_identity() {
    let base = appointment("series", "doc-1", utc(2032, 1, 1, 9, 0), 45);

    let series = scheduler().create_recurring_appointments(
        &base,
        &rule(RecurrenceFrequency::Daily, 1, Some(3)),
        utc(2032, 12, 31, 0, 0),
    );

    assert_eq!(series.len(), 3);
    for (index, occurrence) in series.iter().enumerate() {
        assert_eq!(occurrence.id, format!("series-{}", index));
        assert_eq!(occurrence.doctor_id, "doc-1");
        assert_eq!(occurrence.duration_minutes, 45);
        let info = occurrence.recurrence_info.as_ref().expect("recurrence info");
        assert_eq!(info.series_id, "series");
        assert_eq!(info.occurrence_number, index as u32 + 1);
        assert!(info.is_recurring);
    }
}

#[test]
fn test_end_date_is_inclusive() {
    let base = appointment("series", "doc-1", utc(2032, 1, 1, 9, 0), 30);

    let series = scheduler().create_recurring_appointments(
        &base,
        &rule(RecurrenceFrequency::Daily, 1, None),
        utc(2032, 1, 3, 9, 0),
    );

    assert_eq!(series.len(), 3);
}

#[test]
fn test_default_occurrence_cap() {
    let base = appointment("series", "doc-1", utc(2032, 1, 1, 9, 0), 30);

    for max in [None, Some(0)] {
        let series = scheduler().create_recurring_appointments(
            &base,
            &rule(RecurrenceFrequency::Daily, 1, max),
            utc(2040, 1, 1, 0, 0),
        );
        assert_eq!(series.len(), 52);
    }
}

#[test]
fn test_monthly_series_keeps_day_of_month_where_possible() {
    let base = appointment("series", "doc-1", utc(2032, 1, 31, 9, 0), 30);

    let series = scheduler().create_recurring_appointments(
        &base,
        &rule(RecurrenceFrequency::Monthly, 1, None),
        utc(2032, 4, 30, 23, 0),
    );

    let dates: Vec<_> = series.iter().map(|apt| apt.appointment_date).collect();
    assert_eq!(
        dates,
        vec![
            utc(2032, 1, 31, 9, 0),
            utc(2032, 2, 29, 9, 0),
            utc(2032, 3, 31, 9, 0),
            utc(2032, 4, 30, 9, 0),
        ]
    );
}

#[test]
fn test_yearly_series() {
    let base = appointment("series", "doc-1", utc(2032, 2, 29, 9, 0), 30);

    let series = scheduler().create_recurring_appointments(
        &base,
        &rule(RecurrenceFrequency::Yearly, 1, None),
        utc(2036, 12, 31, 0, 0),
    );

    let dates: Vec<_> = series.iter().map(|apt| apt.appointment_date).collect();
    assert_eq!(
        dates,
        vec![
            utc(2032, 2, 29, 9, 0),
            utc(2033, 2, 28, 9, 0),
            utc(2034, 2, 28, 9, 0),
            utc(2035, 2, 28, 9, 0),
            utc(2036, 2, 29, 9, 0),
        ]
    );
}

#[test]
fn test_end_before_start_yields_nothing() {
    let base = appointment("series", "doc-1", utc(2032, 1, 1, 9, 0), 30);

    let series = scheduler().create_recurring_appointments(
        &base,
        &rule(RecurrenceFrequency::Weekly, 1, None),
        utc(2031, 12, 31, 0, 0),
    );

    assert!(series.is_empty());
}

#[test]
fn test_zero_interval_behaves_as_one() {
    let base = appointment("series", "doc-1", utc(2032, 1, 1, 9, 0), 30);

    let series = scheduler().create_recurring_appointments(
        &base,
        &rule(RecurrenceFrequency::Weekly, 0, Some(3)),
        utc(2032, 12, 31, 0, 0),
    );

    let dates: Vec<_> = series.iter().map(|apt| apt.appointment_date).collect();
    assert_eq!(
        dates,
        vec![utc(2032, 1, 1, 9, 0), utc(2032, 1, 8, 9, 0), utc(2032, 1, 15, 9, 0)]
    );
}
