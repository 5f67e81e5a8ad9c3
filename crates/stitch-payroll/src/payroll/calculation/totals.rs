use serde::{Deserialize, Serialize};

use super::super::domain::ProductionRow;
use super::super::rates::Rates;
use super::row::{calc_row, RowAmounts};

/// A production row as entered, with the amounts it was priced at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    #[serde(flatten)]
    pub row: ProductionRow,
    #[serde(flatten)]
    pub amounts: RowAmounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordTotals {
    pub piece_count: f64,
    pub round_count: f64,
    pub total_stitch: f64,
    pub on_target_amount: f64,
    pub after_target_amount: f64,
}

impl RecordTotals {
    pub fn from_lines(lines: &[ProductionLine]) -> Self {
        lines.iter().fold(Self::default(), |totals, line| Self {
            piece_count: totals.piece_count + line.row.piece_count,
            round_count: totals.round_count + line.row.round_count,
            total_stitch: totals.total_stitch + line.amounts.total_stitch,
            on_target_amount: totals.on_target_amount + line.amounts.on_target_amount,
            after_target_amount: totals.after_target_amount + line.amounts.after_target_amount,
        })
    }
}

pub fn price_lines(rows: &[ProductionRow], rates: &Rates) -> Vec<ProductionLine> {
    rows.iter()
        .map(|row| {
            let row = row.sanitized();
            ProductionLine {
                row,
                amounts: calc_row(&row, rates),
            }
        })
        .collect()
}

pub fn aggregate(rows: &[ProductionRow], rates: &Rates) -> RecordTotals {
    RecordTotals::from_lines(&price_lines(rows, rates))
}
