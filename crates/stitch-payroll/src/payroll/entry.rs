//! Helpers that pre-fill the daily record form.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::domain::Attendance;

/// Date the next record for a staff member should default to.
///
/// Continues the day after the last record unless that would fall before the
/// joining date, in which case entry starts at the joining date.
pub fn next_record_date(
    joining_date: Option<NaiveDate>,
    last_record_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    let after_last = last_record_date.and_then(|last| last.checked_add_days(Days::new(1)));

    match (joining_date, last_record_date) {
        (None, None) => None,
        (Some(joining), None) => Some(joining),
        (None, Some(_)) => after_last,
        (Some(joining), Some(last)) if last >= joining => after_last,
        (Some(joining), Some(_)) => Some(joining),
    }
}

/// Attendance to pre-select for `date`.
///
/// `recent` lists previously used values newest first; only the last two are
/// considered and a Sunday is never carried forward onto a weekday.
pub fn suggest_attendance(date: NaiveDate, recent: &[Attendance]) -> Option<Attendance> {
    if date.weekday() == Weekday::Sun {
        return Some(Attendance::Sunday);
    }

    recent
        .iter()
        .take(2)
        .copied()
        .find(|attendance| *attendance != Attendance::Sunday)
}
