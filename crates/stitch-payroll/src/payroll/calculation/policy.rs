use serde::{Deserialize, Serialize};

use super::super::domain::Attendance;
use super::super::rates::Rates;
use super::totals::RecordTotals;

/// How the base amount of a day is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum BaseRule {
    Zero,
    /// Monthly salary divided by `divisor` days.
    SalaryFraction { divisor: u32 },
    OffAmount,
    Production,
}

pub fn base_rule(attendance: Attendance, salaried: bool) -> BaseRule {
    match (attendance, salaried) {
        (Attendance::Absent | Attendance::Close, _) => BaseRule::Zero,
        (Attendance::Sunday, true) => BaseRule::SalaryFraction { divisor: 30 },
        (Attendance::Sunday, false) => BaseRule::Zero,
        (Attendance::Off, true) => BaseRule::SalaryFraction { divisor: 30 },
        (Attendance::Off, false) => BaseRule::OffAmount,
        (Attendance::Half, true) => BaseRule::SalaryFraction { divisor: 60 },
        (Attendance::Half, false) => BaseRule::Production,
        (Attendance::Day | Attendance::Night, true) => BaseRule::SalaryFraction { divisor: 30 },
        (Attendance::Day | Attendance::Night, false) => BaseRule::Production,
    }
}

/// The one place the on-target threshold is compared.
pub fn target_met(totals: &RecordTotals, rates: &Rates) -> bool {
    totals.on_target_amount >= rates.target_amount
}

pub fn effective_production_amount(totals: &RecordTotals, rates: &Rates) -> f64 {
    if target_met(totals, rates) {
        totals.after_target_amount
    } else {
        totals.on_target_amount
    }
}

impl BaseRule {
    pub fn amount(self, totals: &RecordTotals, salary: Option<f64>, rates: &Rates) -> f64 {
        match self {
            BaseRule::Zero => 0.0,
            BaseRule::SalaryFraction { divisor } => {
                salary.map_or(0.0, |salary| salary / f64::from(divisor))
            }
            BaseRule::OffAmount => rates.off_amount,
            BaseRule::Production => effective_production_amount(totals, rates),
        }
    }
}
