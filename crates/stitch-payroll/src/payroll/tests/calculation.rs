use super::common::*;
use crate::payroll::calculation::{aggregate, calc_row, rate_bearing_stitch, BaseRule};
use crate::payroll::domain::{Attendance, DailyEntry, ProductionRow};
use crate::payroll::rates::{Rates, BUILT_IN_RATES};
use crate::payroll::PayrollEngine;

fn engine() -> PayrollEngine {
    PayrollEngine::new(scenario_rates())
}

#[test]
fn stitch_total_is_uncapped_while_pricing_uses_cap_floor() {
    let row = ProductionRow::new(3000.0, 0.0, 0.0, 2.0);
    let amounts = calc_row(&row, &scenario_rates());

    assert_eq!(amounts.total_stitch, 6000.0);
    assert_eq!(amounts.rate_bearing_stitch, 5000.0);
}

#[test]
fn worked_example_below_target_pays_on_target_tier() {
    let entry = DailyEntry::new(Attendance::Day)
        .with_rows([ProductionRow::new(6000.0, 0.0, 100.0, 1.0)]);
    let result = engine().calculate(&entry, None);

    assert_eq!(result.lines[0].amounts.rate_bearing_stitch, 6000.0);
    assert_close(result.lines[0].amounts.combined, 6.0);
    assert_close(result.totals.on_target_amount, 180.0);
    assert_close(result.totals.after_target_amount, 204.0);
    assert!(!result.target.target_met);
    assert_eq!(result.base_rule, BaseRule::Production);
    assert_close(result.base_amount, 180.0);
    assert_close(result.final_amount(), 180.0);
}

#[test]
fn off_day_for_salaried_staff_pays_daily_salary_and_drops_rows() {
    let entry = DailyEntry::new(Attendance::Off)
        .with_rows([ProductionRow::new(6000.0, 2.0, 100.0, 1.0)]);
    let result = engine().calculate(&entry, Some(30000.0));

    assert!(result.lines.is_empty());
    assert_eq!(result.discarded.production_rows, 1);
    assert_close(result.base_amount, 1000.0);
    assert_close(result.final_amount(), 1000.0);
}

#[test]
fn absent_day_ignores_bonus_and_fixed_amount() {
    let entry = DailyEntry::new(Attendance::Absent)
        .with_bonus(3.0, Some(150.0))
        .with_fix_amount(750.0);
    let result = engine().calculate(&entry, None);

    assert!(result.discarded.bonus);
    assert!(result.discarded.fix_amount);
    assert_eq!(result.fix_amount, None);
    assert_eq!(result.bonus.amount, 0.0);
    assert!(!result.settlement.is_fixed);
    assert_eq!(result.final_amount(), 0.0);
    assert!(result.breakdown().is_empty());
}

#[test]
fn bonus_defaults_to_configured_rate() {
    let entry = DailyEntry::new(Attendance::Day).with_bonus(2.0, None);
    let result = engine().calculate(&entry, None);

    assert_eq!(result.bonus.applied_rate, 200.0);
    assert_close(result.bonus.amount, 400.0);
    assert_close(result.final_amount(), 400.0);
}

#[test]
fn blank_rows_price_to_zero() {
    let rows = [ProductionRow::default(), ProductionRow::new(0.0, 0.0, 0.0, 0.0)];
    let totals = aggregate(&rows, &scenario_rates());

    assert_eq!(totals.total_stitch, 0.0);
    assert_eq!(totals.on_target_amount, 0.0);
    assert_eq!(totals.after_target_amount, 0.0);
}

#[test]
fn cap_floor_boundaries() {
    let cap = scenario_rates().stitch_cap;
    for stitches in [1.0, 250.0, cap - 1.0, cap] {
        assert_eq!(rate_bearing_stitch(stitches, cap), cap, "{stitches}");
    }
    for stitches in [cap + 1.0, 12_500.0] {
        assert_eq!(rate_bearing_stitch(stitches, cap), stitches, "{stitches}");
    }
    assert_eq!(rate_bearing_stitch(0.0, cap), 0.0);
}

#[test]
fn aggregation_ignores_row_order() {
    let a = ProductionRow::new(7200.0, 4.0, 36.0, 3.0);
    let b = ProductionRow::new(1800.0, 0.0, 60.0, 5.0);
    let rates = scenario_rates();

    let forward = aggregate(&[a, b], &rates);
    let backward = aggregate(&[b, a], &rates);

    assert_close(forward.on_target_amount, backward.on_target_amount);
    assert_close(forward.after_target_amount, backward.after_target_amount);
    assert_eq!(forward.piece_count, backward.piece_count);
    assert_eq!(forward.total_stitch, backward.total_stitch);
}

#[test]
fn tier_amounts_never_decrease_with_more_pieces() {
    let rates = scenario_rates();
    let mut previous = calc_row(&ProductionRow::new(8000.0, 2.0, 0.0, 1.0), &rates);

    for pieces in [1.0, 12.0, 48.0, 120.0, 480.0] {
        let current = calc_row(&ProductionRow::new(8000.0, 2.0, pieces, 1.0), &rates);
        assert!(current.on_target_amount >= previous.on_target_amount);
        assert!(current.after_target_amount >= previous.after_target_amount);
        previous = current;
    }
}

#[test]
fn fixed_amount_follows_its_own_attendance_gate() {
    for attendance in Attendance::ordered() {
        let entry = DailyEntry::new(attendance).with_fix_amount(400.0);
        let result = engine().calculate(&entry, None);

        assert_eq!(
            result.settlement.is_fixed,
            attendance.allows_fix_amount(),
            "{attendance}"
        );
        assert_eq!(
            result.discarded.fix_amount,
            !attendance.allows_fix_amount(),
            "{attendance}"
        );
        // no bonus was entered, so only the fixed amount can be dropped
        assert!(!result.discarded.bonus, "{attendance}");
    }
}

#[test]
fn fixed_amount_wins_for_every_attendance_that_accepts_it() {
    let rows = [ProductionRow::new(9000.0, 5.0, 400.0, 34.0)];

    for attendance in Attendance::ordered()
        .into_iter()
        .filter(|attendance| attendance.allows_fix_amount())
    {
        let entry = DailyEntry::new(attendance)
            .with_rows(rows)
            .with_bonus(10.0, None)
            .with_fix_amount(123.45);

        for salary in [None, Some(45000.0)] {
            let result = engine().calculate(&entry, salary);
            assert_eq!(result.final_amount(), 123.45, "{attendance} {salary:?}");
            assert!(result.settlement.is_fixed);
        }
    }
}

#[test]
fn reaching_target_switches_to_after_target_tier() {
    // 10000 stitches * 0.001 * 320 pcs / 100 = 32 combined; 32 * 30 = 960 >= 900
    let entry = DailyEntry::new(Attendance::Night)
        .with_rows([ProductionRow::new(10000.0, 0.0, 320.0, 27.0)]);
    let result = engine().calculate(&entry, None);

    assert!(result.target.target_met);
    assert_close(result.base_amount, 32.0 * 34.0);
    assert_eq!(result.target.effective_pct, 34.0);
}

#[test]
fn half_day_splits_salary_over_sixty() {
    let entry = DailyEntry::new(Attendance::Half)
        .with_rows([ProductionRow::new(6000.0, 0.0, 100.0, 1.0)]);

    let salaried = engine().calculate(&entry, Some(30000.0));
    assert_close(salaried.base_amount, 500.0);

    let piece_rate = engine().calculate(&entry, None);
    assert_close(piece_rate.base_amount, 180.0);
}

#[test]
fn applique_counts_add_to_combined_earnings() {
    let rates = Rates {
        applique_rate: 2.0,
        ..BUILT_IN_RATES
    };
    let amounts = calc_row(&ProductionRow::new(0.0, 5.0, 50.0, 0.0), &rates);

    // 2.0 * 5 * 50 / 100
    assert_close(amounts.combined, 5.0);
    assert_eq!(amounts.total_stitch, 0.0);
}

#[test]
fn non_positive_salary_is_treated_as_piece_rate() {
    let entry = DailyEntry::new(Attendance::Off);
    let result = engine().calculate(&entry, Some(0.0));

    assert!(!result.salaried);
    assert_eq!(result.base_amount, BUILT_IN_RATES.off_amount);
}
