use tracing::{debug, info};

use shared_config::SchedulingConfig;

use crate::models::{
    Appointment, CostBreakdown, CostLineItems, Doctor, InsuranceCoverage, Patient,
};

/// Patient-facing cost estimates. Figures are estimates only; nothing here
/// charges or reserves money.
#[derive(Debug, Clone)]
pub struct PricingService {
    config: SchedulingConfig,
}

struct InsuranceSplit {
    coverage: f64,
    patient_share: f64,
    deductible_applied: f64,
    deductible_remaining: Option<f64>,
}

impl PricingService {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn calculate_cost(
        &self,
        appointment: &Appointment,
        doctor: &Doctor,
        patient: &Patient,
        insurance: Option<&InsuranceCoverage>,
    ) -> CostBreakdown {
        debug!(
            "Calculating cost for appointment {} ({}, {} minutes)",
            appointment.id, appointment.appointment_type, appointment.duration_minutes
        );

        let consultation_fee = self.consultation_fee(doctor);
        let typed_price = consultation_fee * appointment.appointment_type.cost_multiplier();
        let base_cost = typed_price * self.duration_multiplier(appointment);

        let split = match insurance {
            Some(coverage) if coverage.is_in_network => self.apply_insurance(base_cost, coverage),
            _ => InsuranceSplit {
                coverage: 0.0,
                patient_share: base_cost,
                deductible_applied: 0.0,
                deductible_remaining: None,
            },
        };

        let discount = self.apply_loyalty_discount(split.patient_share, doctor, patient);
        let patient_responsibility = (split.patient_share - discount).max(0.0);

        info!(
            "Estimated cost for appointment {}: base {:.2}, patient pays {:.2} {}",
            appointment.id, base_cost, patient_responsibility, self.config.currency
        );

        CostBreakdown {
            base_cost: round_currency(base_cost),
            insurance_coverage: round_currency(split.coverage),
            patient_responsibility: round_currency(patient_responsibility),
            breakdown: CostLineItems {
                consultation_fee: round_currency(consultation_fee),
                type_adjustment: round_currency(typed_price - consultation_fee),
                duration_adjustment: round_currency(base_cost - typed_price),
                insurance_adjustment: round_currency(-split.coverage),
                deductible_applied: round_currency(split.deductible_applied),
                discounts: round_currency(-discount),
            },
            deductible_remaining: split.deductible_remaining.map(round_currency),
            estimated_only: true,
            currency: self.config.currency.clone(),
        }
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    fn consultation_fee(&self, doctor: &Doctor) -> f64 {
        doctor
            .consultation_fee
            .filter(|fee| *fee > 0.0)
            .unwrap_or(self.config.default_consultation_fee)
    }

    /// Duration relative to the standard consultation length.
    fn duration_multiplier(&self, appointment: &Appointment) -> f64 {
        let standard = self.config.standard_duration_minutes;
        f64::from(appointment.effective_duration_minutes(standard)) / f64::from(standard)
    }

    /// Coverage first, then the deductible moves money back to the patient,
    /// then the copay acts as a floor on the patient's share.
    fn apply_insurance(&self, base_cost: f64, insurance: &InsuranceCoverage) -> InsuranceSplit {
        let percentage = insurance.coverage_percentage.clamp(0.0, 100.0);
        let mut coverage = base_cost * (percentage / 100.0);
        let mut patient_share = base_cost - coverage;
        let mut deductible_applied = 0.0;
        let mut deductible_remaining = insurance.deductible_remaining.max(0.0);

        if deductible_remaining > 0.0 {
            deductible_applied = coverage.min(deductible_remaining);
            coverage -= deductible_applied;
            patient_share += deductible_applied;
            deductible_remaining -= deductible_applied;
        }

        if let Some(copay) = insurance.copay.filter(|copay| *copay > 0.0) {
            patient_share = patient_share.max(copay);
        }

        InsuranceSplit {
            coverage,
            patient_share,
            deductible_applied,
            deductible_remaining: Some(deductible_remaining),
        }
    }

    /// Returning patients (explicitly not new) get the doctor's discount on
    /// whatever they still owe after insurance.
    fn apply_loyalty_discount(&self, patient_share: f64, doctor: &Doctor, patient: &Patient) -> f64 {
        match (patient.is_new_patient, doctor.returning_patient_discount) {
            (Some(false), Some(percentage)) if percentage > 0.0 => {
                patient_share * (percentage.clamp(0.0, 100.0) / 100.0)
            }
            _ => 0.0,
        }
    }
}

fn round_currency(amount: f64) -> f64 {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency_drops_negative_zero() {
        assert_eq!(round_currency(-0.0).to_string(), "0");
        assert_eq!(round_currency(12.346), 12.35);
        assert_eq!(round_currency(-7.004), -7.0);
    }
}
