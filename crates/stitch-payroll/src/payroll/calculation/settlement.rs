use serde::{Deserialize, Serialize};

use super::super::domain::sanitize_count;
use super::super::rates::Rates;
use super::policy::{effective_production_amount, target_met};
use super::totals::RecordTotals;

/// Bonus actually paid: the per-unit rate applied and the resulting amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusLine {
    pub qty: f64,
    pub applied_rate: f64,
    pub amount: f64,
}

impl BonusLine {
    /// An explicit override wins even when it is zero.
    pub fn price(qty: f64, rate_override: Option<f64>, rates: &Rates) -> Self {
        let qty = sanitize_count(qty);
        let applied_rate = rate_override.map_or(rates.bonus_rate, sanitize_count);
        Self {
            qty,
            applied_rate,
            amount: qty * applied_rate,
        }
    }

    pub fn none(rates: &Rates) -> Self {
        Self {
            qty: 0.0,
            applied_rate: rates.bonus_rate,
            amount: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub final_amount: f64,
    pub is_fixed: bool,
}

impl Settlement {
    pub fn resolve(base_amount: f64, bonus_amount: f64, fix_amount: Option<f64>) -> Self {
        match fix_amount {
            Some(fixed) => Self {
                final_amount: fixed,
                is_fixed: true,
            },
            None => Self {
                final_amount: base_amount + bonus_amount,
                is_fixed: false,
            },
        }
    }
}

/// One labelled line of the final-amount card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub label: String,
    pub amount: f64,
    /// False when the line is shown but overridden by a fixed amount.
    pub counted: bool,
}

impl BreakdownItem {
    fn new(label: &str, amount: f64, counted: bool) -> Self {
        Self {
            label: label.to_string(),
            amount,
            counted,
        }
    }
}

pub fn breakdown(
    base_amount: f64,
    bonus_amount: f64,
    fix_amount: Option<f64>,
    salaried: bool,
) -> Vec<BreakdownItem> {
    let mut items = Vec::new();

    match fix_amount {
        Some(fixed) => {
            if base_amount > 0.0 {
                items.push(BreakdownItem::new("Base (ignored)", base_amount, false));
            }
            if bonus_amount > 0.0 {
                items.push(BreakdownItem::new("Bonus (ignored)", bonus_amount, false));
            }
            items.push(BreakdownItem::new("Fix Amount applied", fixed, true));
        }
        None => {
            if base_amount > 0.0 {
                let label = if salaried { "Salary-based" } else { "Production" };
                items.push(BreakdownItem::new(label, base_amount, true));
            }
            if bonus_amount > 0.0 {
                items.push(BreakdownItem::new("Bonus", bonus_amount, true));
            }
        }
    }

    items
}

/// Tier badge data shown next to a record's production totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetStatus {
    pub target_amount: f64,
    pub target_met: bool,
    pub shortfall: f64,
    pub effective_pct: f64,
    pub effective_amount: f64,
}

impl TargetStatus {
    pub fn evaluate(totals: &RecordTotals, rates: &Rates) -> Self {
        let met = target_met(totals, rates);
        Self {
            target_amount: rates.target_amount,
            target_met: met,
            shortfall: (rates.target_amount - totals.on_target_amount).max(0.0),
            effective_pct: if met {
                rates.after_target_pct
            } else {
                rates.on_target_pct
            },
            effective_amount: effective_production_amount(totals, rates),
        }
    }
}
