use crate::infra::{build_service, load_rate_book, parse_date, parse_month, PayrollService};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use stitch_payroll::config::PayrollConfig;
use stitch_payroll::error::AppError;
use stitch_payroll::payroll::{
    suggest_attendance, sync_pieces_rounds, Attendance, BreakdownItem, CountEdit, DailyEntry,
    PayrollEngine, ProductionRow, RateConfigStore, RecordInput, RecordServiceError,
    SalarySlipBatch, SlipBuildError, SlipPeriod, StaffProfile, StaffRecord,
};

#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// Record date (YYYY-MM-DD); selects the effective rate configuration.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: NaiveDate,
    /// Attendance category (Day, Night, Half, Absent, Off, Close, Sunday).
    #[arg(long, default_value = "Day")]
    pub(crate) attendance: Attendance,
    /// Monthly salary; omit for piece-rate staff.
    #[arg(long)]
    pub(crate) salary: Option<f64>,
    /// Production row as stitches,applique,pieces,rounds. Repeatable.
    #[arg(long = "row", value_parser = parse_row)]
    pub(crate) rows: Vec<ProductionRow>,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) bonus_qty: f64,
    /// Per-unit bonus rate; defaults to the configured rate.
    #[arg(long)]
    pub(crate) bonus_rate: Option<f64>,
    /// Fixed payable amount overriding everything else.
    #[arg(long)]
    pub(crate) fix_amount: Option<f64>,
    /// Rate configuration history CSV.
    #[arg(long)]
    pub(crate) rates_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Month to simulate (YYYY-MM).
    #[arg(long, default_value = "2026-03", value_parser = parse_month)]
    pub(crate) month: SlipPeriod,
    /// Number of consecutive entries recorded per staff member.
    #[arg(long, default_value_t = 7)]
    pub(crate) days: usize,
    /// Rate configuration history CSV.
    #[arg(long)]
    pub(crate) rates_csv: Option<PathBuf>,
    /// Print salary slips as CSV instead of a table.
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SlipsArgs {
    /// Slip month (YYYY-MM). Ignored when --from and --to are given.
    #[arg(long, default_value = "2026-03", value_parser = parse_month)]
    pub(crate) month: SlipPeriod,
    /// Range start (YYYY-MM-DD), inclusive.
    #[arg(long, value_parser = parse_date, requires = "to")]
    pub(crate) from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD), inclusive.
    #[arg(long, value_parser = parse_date, requires = "from")]
    pub(crate) to: Option<NaiveDate>,
    /// Number of demo entries recorded per staff member before slips are built.
    #[arg(long, default_value_t = 7)]
    pub(crate) days: usize,
    /// Rate configuration history CSV.
    #[arg(long)]
    pub(crate) rates_csv: Option<PathBuf>,
    /// Print salary slips as CSV instead of a table.
    #[arg(long)]
    pub(crate) csv: bool,
}

pub(crate) fn parse_row(raw: &str) -> Result<ProductionRow, String> {
    let values = raw
        .split(',')
        .map(|part| {
            let part = part.trim();
            if part.is_empty() {
                Ok(0.0)
            } else {
                part.parse::<f64>()
                    .map_err(|err| format!("'{part}' is not a number ({err})"))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [stitches, applique, pieces, rounds] => {
            Ok(ProductionRow::new(*stitches, *applique, *pieces, *rounds))
        }
        _ => Err(format!(
            "expected stitches,applique,pieces,rounds but got '{raw}'"
        )),
    }
}

pub(crate) fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let PreviewArgs {
        date,
        attendance,
        salary,
        rows,
        bonus_qty,
        bonus_rate,
        fix_amount,
        rates_csv,
    } = args;

    let book = load_rate_book(&PayrollConfig {
        rate_config_csv: rates_csv,
    })?;
    let snapshot = book
        .resolve_or_default(date)
        .map_err(RecordServiceError::from)?;

    let mut entry = DailyEntry::new(attendance)
        .with_rows(rows)
        .with_bonus(bonus_qty, bonus_rate);
    entry.fix_amount = fix_amount;

    let salary = salary.filter(|amount| amount.is_finite() && *amount > 0.0);
    let calculation = PayrollEngine::new(snapshot.rates).calculate(&entry, salary);

    match snapshot.effective_date {
        Some(effective) => println!("Rates effective from {effective}"),
        None => println!("Rates: built-in defaults"),
    }
    println!("{date} {attendance}");
    for (index, line) in calculation.lines.iter().enumerate() {
        println!(
            "  row {}: {} stitches x {} rounds, {} pcs -> on target {:.2}, after target {:.2}",
            index + 1,
            line.row.daily_stitch_count,
            line.row.round_count,
            line.row.piece_count,
            line.amounts.on_target_amount,
            line.amounts.after_target_amount
        );
    }
    if !calculation.lines.is_empty() {
        let target = &calculation.target;
        if target.target_met {
            println!(
                "  Target {:.2} met, paying {:.2}",
                target.target_amount, target.effective_amount
            );
        } else {
            println!(
                "  Target {:.2} missed by {:.2}, paying {:.2}",
                target.target_amount, target.shortfall, target.effective_amount
            );
        }
    }
    if calculation.discarded.any() {
        println!(
            "  Ignored for {attendance}: {:?}",
            calculation.discarded
        );
    }
    render_breakdown(&calculation.breakdown());
    println!("Final amount: {:.2}", calculation.final_amount());

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        month,
        days,
        rates_csv,
        csv,
    } = args;

    let book = load_rate_book(&PayrollConfig {
        rate_config_csv: rates_csv,
    })?;
    let (service, directory) = build_service(book);
    let roster = directory.roster();

    println!("Stitch payroll demo for {}", month.label());
    for (index, profile) in roster.iter().enumerate() {
        println!("\n{} ({})", profile.name, profile.staff_id);
        for record in record_demo_days(&service, profile, index, month, days)? {
            println!(
                "  {} {:<7} {:>9.2}{}",
                record.date,
                record.attendance.label(),
                record.final_amount,
                if record.is_fixed { " (fixed)" } else { "" }
            );
        }
    }

    let batch = service.salary_slips(month)?;
    if csv {
        print!("{}", batch.to_csv()?);
    } else {
        render_slips(&batch);
    }

    Ok(())
}

pub(crate) fn run_slips(args: SlipsArgs) -> Result<(), AppError> {
    let SlipsArgs {
        month,
        from,
        to,
        days,
        rates_csv,
        csv,
    } = args;

    let period = match (from, to) {
        (Some(from), Some(to)) => SlipPeriod::range(from, to)
            .map_err(|err| RecordServiceError::from(SlipBuildError::from(err)))?,
        _ => month,
    };

    let book = load_rate_book(&PayrollConfig {
        rate_config_csv: rates_csv,
    })?;
    let (service, directory) = build_service(book);
    for (index, profile) in directory.roster().iter().enumerate() {
        record_demo_days(&service, profile, index, period, days)?;
    }

    let batch = service.salary_slips(period)?;
    if csv {
        print!("{}", batch.to_csv()?);
    } else {
        render_slips(&batch);
    }

    Ok(())
}

/// Record consecutive days for one staff member, following the next-date and
/// attendance suggestions, until `days` entries exist or the period ends.
fn record_demo_days(
    service: &PayrollService,
    profile: &StaffProfile,
    index: usize,
    period: SlipPeriod,
    days: usize,
) -> Result<Vec<StaffRecord>, AppError> {
    let (from, to) = period
        .bounds()
        .map_err(|err| RecordServiceError::from(SlipBuildError::from(err)))?;
    let mut date = profile.joining_date.map_or(from, |joined| joined.max(from));
    let mut suggested = suggest_attendance(date, &[]);
    let mut recorded = Vec::with_capacity(days);

    for day in 0..days {
        if date > to {
            break;
        }

        let attendance = suggested.unwrap_or(Attendance::Day);
        let mut input = RecordInput::new(profile.staff_id.clone(), date, attendance);
        if attendance.allows_production() {
            let pcs_per_round = service.rates_for(date)?.rates.pcs_per_round;
            input.production = vec![demo_row(index, day, pcs_per_round)];
        }
        if attendance.allows_bonus() && day % 3 == 2 {
            input.bonus_qty = 1.0;
        }
        if index == 0 && day == 4 {
            input.fix_amount = Some(500.0);
        }

        recorded.push(service.create(input)?);

        let next = service.next_record_date(&profile.staff_id)?;
        match next.next_date {
            Some(next_date) => {
                date = next_date;
                suggested = next.suggested_attendance;
            }
            None => break,
        }
    }

    Ok(recorded)
}

fn demo_row(index: usize, day: usize, pcs_per_round: u32) -> ProductionRow {
    let stitches = 3200.0 + 900.0 * index as f64 + 350.0 * day as f64;
    let pieces = 80.0 + 10.0 * day as f64;
    let row = ProductionRow::new(stitches, index as f64, 0.0, 0.0);
    sync_pieces_rounds(row, CountEdit::Pieces(pieces), pcs_per_round)
}

fn render_breakdown(items: &[BreakdownItem]) {
    if items.is_empty() {
        println!("  Nothing payable");
        return;
    }
    for item in items {
        let marker = if item.counted { "" } else { " (not counted)" };
        println!("  {:<20} {:>9.2}{}", item.label, item.amount, marker);
    }
}

fn render_slips(batch: &SalarySlipBatch) {
    println!("\nSalary slips: {} ({} to {})", batch.label, batch.from, batch.to);
    for slip in &batch.slips {
        println!(
            "  {:<14} {:>2} days  amount {:>9.2}  bonus {:>3} / {:>7.2}  total {:>9.2}",
            slip.name, slip.days, slip.amount, slip.bonus_qty, slip.bonus_amount, slip.total
        );
    }
    println!("  Grand total {:.2}", batch.grand_total);
}
