use super::common::*;
use crate::payroll::domain::{Attendance, RecordInput, StaffId};
use crate::payroll::repository::{RecordFilter, StaffRecordRepository};
use crate::payroll::slips::{SalarySlipBatch, SlipPeriod};

fn seed(service: &MemoryService) {
    let piece = piece_rate_staff();
    let salaried = salaried_staff();

    let mut bonus_day = day_input(&piece, date(2026, 3, 2));
    bonus_day.bonus_qty = 2.0;
    service.create(bonus_day).expect("bonus day");

    let mut fixed_day = day_input(&piece, date(2026, 3, 3));
    fixed_day.bonus_qty = 1.0;
    fixed_day.fix_amount = Some(100.0);
    service.create(fixed_day).expect("fixed day");

    service
        .create(RecordInput::new(
            salaried.staff_id.clone(),
            date(2026, 3, 2),
            Attendance::Off,
        ))
        .expect("salaried off day");

    // outside March
    service
        .create(day_input(&salaried, date(2026, 4, 1)))
        .expect("april record");
}

#[test]
fn slips_group_records_per_staff_within_period() {
    let (service, _, _) = build_service();
    seed(&service);

    let batch = service
        .salary_slips(SlipPeriod::month(2026, 3).expect("valid month"))
        .expect("slips built");

    assert_eq!(batch.label, "March 2026");
    let names: Vec<_> = batch.slips.iter().map(|slip| slip.name.as_str()).collect();
    assert_eq!(names, vec!["Amina", "Bilal"]);

    let amina = &batch.slips[0];
    assert_eq!(amina.days, 1);
    assert_close(amina.total, 1000.0);

    let bilal = &batch.slips[1];
    assert_eq!(bilal.days, 2);
    // 180 + 400 bonus, then a fixed 100 with 200 bonus recorded
    assert_close(bilal.total, 680.0);
    assert_eq!(bilal.bonus_qty, 3.0);
    assert_close(bilal.bonus_amount, 600.0);
    assert_close(bilal.amount, 180.0);

    assert_close(batch.grand_total, 1680.0);
}

#[test]
fn unknown_staff_names_fall_back() {
    let (service, records, _) = build_service();
    seed(&service);
    let mut stray = records
        .list(&RecordFilter::default())
        .expect("list")
        .remove(0);
    stray.staff_id = StaffId("stf-left".to_string());
    stray.date = date(2026, 3, 20);
    stray.record_id.0.push_str("-copy");
    records.insert(stray).expect("stray inserted");

    let all = records.list(&RecordFilter::default()).expect("list");
    let batch = SalarySlipBatch::build(
        SlipPeriod::range(date(2026, 3, 1), date(2026, 3, 31)).expect("valid range"),
        &all,
        &directory(),
    )
    .expect("slips built");

    assert!(batch.slips.iter().any(|slip| slip.name == "Unknown"));
    assert_eq!(batch.label, "2026-03-01 to 2026-03-31");
}

#[test]
fn empty_period_yields_no_slips() {
    let (service, _, _) = build_service();
    let batch = service
        .salary_slips(SlipPeriod::month(2025, 12).expect("valid month"))
        .expect("slips built");

    assert!(batch.slips.is_empty());
    assert_eq!(batch.grand_total, 0.0);
    assert_eq!(
        batch.to_csv().expect("csv export"),
        "period,staff_id,name,days,amount,bonus_qty,bonus_amount,total\n"
    );
}
