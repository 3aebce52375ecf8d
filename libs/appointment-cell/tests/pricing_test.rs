// libs/appointment-cell/tests/pricing_test.rs

mod common;

use appointment_cell::models::{AppointmentType, InsuranceCoverage};

use common::{adult_patient, appointment, doctor, scheduler, utc};

fn typed(appointment_type: AppointmentType, duration_minutes: i32) -> appointment_cell::models::Appointment {
    let mut apt = appointment("apt-1", "doc-1", utc(2031, 3, 5, 10, 0), duration_minutes);
    apt.appointment_type = appointment_type;
    apt
}

fn in_network(coverage_percentage: f64, deductible_remaining: f64, copay: Option<f64>) -> InsuranceCoverage {
    InsuranceCoverage {
        is_in_network: true,
        coverage_percentage,
        deductible_remaining,
        copay,
    }
}

#[test]
fn test_standard_consultation_costs_the_fee() {
    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &doctor("doc-1"),
        &adult_patient(),
        None,
    );

    assert_eq!(cost.base_cost, 100.0);
    assert_eq!(cost.patient_responsibility, 100.0);
    assert_eq!(cost.insurance_coverage, 0.0);
    assert!(cost.estimated_only);
    assert_eq!(cost.currency, "USD");
    assert!(cost.deductible_remaining.is_none());
}

#[test]
fn test_type_and_duration_scale_the_fee() {
    let mut specialist = doctor("doc-1");
    specialist.consultation_fee = Some(200.0);

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::FollowUp, 15),
        &specialist,
        &adult_patient(),
        None,
    );

    assert_eq!(cost.base_cost, 70.0);
    assert_eq!(cost.breakdown.consultation_fee, 200.0);
    assert_eq!(cost.breakdown.type_adjustment, -60.0);
    assert_eq!(cost.breakdown.duration_adjustment, -70.0);
}

#[test]
fn test_procedure_line_items() {
    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Procedure, 60),
        &doctor("doc-1"),
        &adult_patient(),
        None,
    );

    assert_eq!(cost.base_cost, 400.0);
    assert_eq!(cost.breakdown.type_adjustment, 100.0);
    assert_eq!(cost.breakdown.duration_adjustment, 200.0);
}

#[test]
fn test_missing_fee_uses_default() {
    let mut unpriced = doctor("doc-1");
    unpriced.consultation_fee = None;

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Emergency, 30),
        &unpriced,
        &adult_patient(),
        None,
    );

    assert_eq!(cost.base_cost, 150.0);
    assert_eq!(cost.breakdown.consultation_fee, 100.0);
}

#[test]
fn test_full_coverage_leaves_nothing_to_pay() {
    let insurance = in_network(100.0, 0.0, None);

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &doctor("doc-1"),
        &adult_patient(),
        Some(&insurance),
    );

    assert_eq!(cost.insurance_coverage, 100.0);
    assert_eq!(cost.patient_responsibility, 0.0);
    assert_eq!(cost.breakdown.insurance_adjustment, -100.0);
}

#[test]
fn test_deductible_moves_coverage_back_to_patient() {
    let insurance = in_network(80.0, 50.0, Some(20.0));

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &doctor("doc-1"),
        &adult_patient(),
        Some(&insurance),
    );

    assert_eq!(cost.insurance_coverage, 30.0);
    assert_eq!(cost.patient_responsibility, 70.0);
    assert_eq!(cost.breakdown.deductible_applied, 50.0);
    assert_eq!(cost.deductible_remaining, Some(0.0));
}

#[test]
fn test_large_deductible_absorbs_all_coverage() {
    let insurance = in_network(80.0, 200.0, None);

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &doctor("doc-1"),
        &adult_patient(),
        Some(&insurance),
    );

    assert_eq!(cost.insurance_coverage, 0.0);
    assert_eq!(cost.patient_responsibility, 100.0);
    assert_eq!(cost.deductible_remaining, Some(120.0));
}

#[test]
fn test_copay_is_a_floor() {
    let insurance = in_network(90.0, 0.0, Some(25.0));

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &doctor("doc-1"),
        &adult_patient(),
        Some(&insurance),
    );

    assert_eq!(cost.patient_responsibility, 25.0);
}

#[test]
fn test_out_of_network_pays_base_cost() {
    let mut insurance = in_network(80.0, 0.0, Some(20.0));
    insurance.is_in_network = false;

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &doctor("doc-1"),
        &adult_patient(),
        Some(&insurance),
    );

    assert_eq!(cost.insurance_coverage, 0.0);
    assert_eq!(cost.patient_responsibility, 100.0);
    assert!(cost.deductible_remaining.is_none());
}

#[test]
fn test_returning_patient_discount() {
    let mut loyal_doctor = doctor("doc-1");
    loyal_doctor.returning_patient_discount = Some(10.0);
    let mut returning = adult_patient();
    returning.is_new_patient = Some(false);

    let cost = scheduler().calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &loyal_doctor,
        &returning,
        None,
    );

    assert_eq!(cost.patient_responsibility, 90.0);
    assert_eq!(cost.breakdown.discounts, -10.0);
}

#[test]
fn test_new_or_unknown_patients_get_no_discount() {
    let mut loyal_doctor = doctor("doc-1");
    loyal_doctor.returning_patient_discount = Some(10.0);
    let scheduler = scheduler();

    for is_new_patient in [Some(true), None] {
        let mut patient = adult_patient();
        patient.is_new_patient = is_new_patient;

        let cost = scheduler.calculate_cost(
            &typed(AppointmentType::Consultation, 30),
            &loyal_doctor,
            &patient,
            None,
        );
        assert_eq!(cost.patient_responsibility, 100.0);
        assert_eq!(cost.breakdown.discounts, 0.0);
    }
}

#[test]
fn test_out_of_range_percentages_never_go_negative() {
    let mut generous_doctor = doctor("doc-1");
    generous_doctor.returning_patient_discount = Some(250.0);
    let mut returning = adult_patient();
    returning.is_new_patient = Some(false);
    let scheduler = scheduler();

    let over_covered = in_network(150.0, 0.0, None);
    let cost = scheduler.calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &doctor("doc-1"),
        &adult_patient(),
        Some(&over_covered),
    );
    assert_eq!(cost.insurance_coverage, 100.0);
    assert_eq!(cost.patient_responsibility, 0.0);

    let cost = scheduler.calculate_cost(
        &typed(AppointmentType::Consultation, 30),
        &generous_doctor,
        &returning,
        None,
    );
    assert_eq!(cost.patient_responsibility, 0.0);
    assert_eq!(cost.breakdown.discounts, -100.0);
}
