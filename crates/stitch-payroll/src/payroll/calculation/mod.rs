mod policy;
mod row;
mod settlement;
mod totals;

pub use policy::{base_rule, effective_production_amount, target_met, BaseRule};
pub use row::{calc_row, parse_count, rate_bearing_stitch, sync_pieces_rounds, CountEdit, RowAmounts};
pub use settlement::{breakdown, BonusLine, BreakdownItem, Settlement, TargetStatus};
pub use totals::{aggregate, price_lines, ProductionLine, RecordTotals};

use serde::{Deserialize, Serialize};

use super::domain::{Attendance, DailyEntry};
use super::rates::Rates;

/// Stateless calculator that applies one set of rates to a day's entry.
///
/// Record creation, edits, previews and read-only views all go through this
/// engine so a displayed amount can never disagree with a stored one.
pub struct PayrollEngine {
    rates: Rates,
}

impl PayrollEngine {
    pub fn new(rates: Rates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }

    pub fn calculate(&self, entry: &DailyEntry, salary: Option<f64>) -> PayrollCalculation {
        let attendance = entry.attendance;
        let salary = salary.filter(|salary| salary.is_finite() && *salary > 0.0);
        let mut discarded = DiscardedInputs::default();

        let lines = if attendance.allows_production() {
            price_lines(&entry.production, &self.rates)
        } else {
            discarded.production_rows = entry
                .production
                .iter()
                .filter(|row| !row.is_blank())
                .count();
            Vec::new()
        };
        let totals = RecordTotals::from_lines(&lines);

        let (bonus, bonus_rate) = if attendance.allows_bonus() {
            (
                BonusLine::price(entry.bonus_qty, entry.bonus_rate, &self.rates),
                entry.bonus_rate,
            )
        } else {
            discarded.bonus = entry.bonus_qty > 0.0 || entry.bonus_rate.is_some();
            (BonusLine::none(&self.rates), None)
        };

        let fix_amount = if attendance.allows_fix_amount() {
            entry.fix_amount
        } else {
            discarded.fix_amount = entry.fix_amount.is_some();
            None
        };

        let rule = base_rule(attendance, salary.is_some());
        let base_amount = rule.amount(&totals, salary, &self.rates);
        let settlement = Settlement::resolve(base_amount, bonus.amount, fix_amount);

        PayrollCalculation {
            attendance,
            salaried: salary.is_some(),
            lines,
            totals,
            target: TargetStatus::evaluate(&totals, &self.rates),
            base_rule: rule,
            base_amount,
            bonus,
            bonus_rate,
            fix_amount,
            settlement,
            discarded,
        }
    }
}

/// Inputs dropped because the attendance category does not accept them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscardedInputs {
    pub production_rows: usize,
    pub bonus: bool,
    pub fix_amount: bool,
}

impl DiscardedInputs {
    pub fn any(&self) -> bool {
        self.production_rows > 0 || self.bonus || self.fix_amount
    }
}

/// Everything derived for one staff member's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollCalculation {
    pub attendance: Attendance,
    pub salaried: bool,
    pub lines: Vec<ProductionLine>,
    pub totals: RecordTotals,
    pub target: TargetStatus,
    pub base_rule: BaseRule,
    pub base_amount: f64,
    pub bonus: BonusLine,
    /// Override as entered; `None` means the configured default applied.
    pub bonus_rate: Option<f64>,
    pub fix_amount: Option<f64>,
    #[serde(flatten)]
    pub settlement: Settlement,
    pub discarded: DiscardedInputs,
}

impl PayrollCalculation {
    pub fn final_amount(&self) -> f64 {
        self.settlement.final_amount
    }

    pub fn breakdown(&self) -> Vec<BreakdownItem> {
        breakdown(
            self.base_amount,
            self.bonus.amount,
            self.fix_amount,
            self.salaried,
        )
    }
}
