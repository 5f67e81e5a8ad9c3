use serde::{Deserialize, Serialize};

use super::super::domain::{sanitize_count, ProductionRow};
use super::super::rates::Rates;

/// Monetary outcome of a single production row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RowAmounts {
    /// Reported stitches, `daily_stitch_count * round_count`, never capped.
    pub total_stitch: f64,
    pub rate_bearing_stitch: f64,
    pub combined: f64,
    pub on_target_amount: f64,
    pub after_target_amount: f64,
}

/// Stitch value used for pricing. Positive counts at or under the cap bill as the cap.
pub fn rate_bearing_stitch(daily_stitch_count: f64, stitch_cap: f64) -> f64 {
    let stitches = sanitize_count(daily_stitch_count);
    if stitches > 0.0 && stitches <= stitch_cap {
        stitch_cap
    } else {
        stitches
    }
}

pub fn calc_row(row: &ProductionRow, rates: &Rates) -> RowAmounts {
    let row = row.sanitized();

    let total_stitch = row.daily_stitch_count * row.round_count;
    let rate_bearing = rate_bearing_stitch(row.daily_stitch_count, rates.stitch_cap);

    let stitch_base = rate_bearing * rates.stitch_rate * row.piece_count / 100.0;
    let applique_base = rates.applique_rate * row.applique_count * row.piece_count / 100.0;
    let combined = stitch_base + applique_base;

    RowAmounts {
        total_stitch,
        rate_bearing_stitch: rate_bearing,
        combined,
        on_target_amount: combined * rates.on_target_pct,
        after_target_amount: combined * rates.after_target_pct,
    }
}

/// The field the operator just typed into; the other one follows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountEdit {
    Pieces(f64),
    Rounds(f64),
}

impl CountEdit {
    pub fn pieces(raw: &str) -> Self {
        CountEdit::Pieces(parse_count(raw))
    }

    pub fn rounds(raw: &str) -> Self {
        CountEdit::Rounds(parse_count(raw))
    }
}

/// Blank, non-numeric and non-positive input all read as zero.
pub fn parse_count(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(sanitize_count).unwrap_or(0.0)
}

/// Apply an interactive pieces/rounds edit, keeping both fields consistent.
pub fn sync_pieces_rounds(row: ProductionRow, edit: CountEdit, pcs_per_round: u32) -> ProductionRow {
    let per_round = f64::from(pcs_per_round.max(1));

    match edit {
        CountEdit::Pieces(value) => {
            let pieces = sanitize_count(value);
            ProductionRow {
                piece_count: pieces,
                round_count: (pieces / per_round).ceil(),
                ..row
            }
        }
        CountEdit::Rounds(value) => {
            let rounds = sanitize_count(value);
            ProductionRow {
                piece_count: rounds * per_round,
                round_count: rounds,
                ..row
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::rates::BUILT_IN_RATES;

    #[test]
    fn cap_floor_applies_only_to_positive_counts_within_cap() {
        assert_eq!(rate_bearing_stitch(0.0, 5000.0), 0.0);
        assert_eq!(rate_bearing_stitch(1.0, 5000.0), 5000.0);
        assert_eq!(rate_bearing_stitch(5000.0, 5000.0), 5000.0);
        assert_eq!(rate_bearing_stitch(5001.0, 5000.0), 5001.0);
        assert_eq!(rate_bearing_stitch(-20.0, 5000.0), 0.0);
    }

    #[test]
    fn blank_row_prices_to_zero() {
        assert_eq!(
            calc_row(&ProductionRow::default(), &BUILT_IN_RATES),
            RowAmounts::default()
        );
    }

    #[test]
    fn sync_from_pieces_rounds_up() {
        let row = sync_pieces_rounds(ProductionRow::default(), CountEdit::pieces("25"), 12);
        assert_eq!(row.piece_count, 25.0);
        assert_eq!(row.round_count, 3.0);
    }

    #[test]
    fn sync_from_rounds_multiplies() {
        let row = sync_pieces_rounds(ProductionRow::default(), CountEdit::rounds("4"), 12);
        assert_eq!(row.piece_count, 48.0);
        assert_eq!(row.round_count, 4.0);
    }

    #[test]
    fn sync_clears_partner_field_on_invalid_input() {
        let start = ProductionRow::new(3000.0, 2.0, 24.0, 2.0);

        for raw in ["", "abc", "0", "-3"] {
            let row = sync_pieces_rounds(start, CountEdit::pieces(raw), 12);
            assert_eq!((row.piece_count, row.round_count), (0.0, 0.0), "input {raw:?}");
            assert_eq!(row.daily_stitch_count, 3000.0);
        }

        let row = sync_pieces_rounds(start, CountEdit::rounds(" "), 12);
        assert_eq!((row.piece_count, row.round_count), (0.0, 0.0));
    }

    #[test]
    fn sync_tolerates_zero_round_size() {
        let row = sync_pieces_rounds(ProductionRow::default(), CountEdit::Pieces(5.0), 0);
        assert_eq!(row.round_count, 5.0);
    }
}
