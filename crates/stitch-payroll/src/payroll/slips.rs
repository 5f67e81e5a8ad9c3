//! Salary slips aggregated from persisted day records.

use std::collections::BTreeMap;

use chrono::{Month, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::StaffId;
use super::repository::{RepositoryError, StaffDirectory, StaffRecord};

/// Payroll period covered by a slip batch. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlipPeriod {
    Month { year: i32, month: u32 },
    Range { from: NaiveDate, to: NaiveDate },
}

impl SlipPeriod {
    pub fn month(year: i32, month: u32) -> Result<Self, SlipPeriodError> {
        let period = SlipPeriod::Month { year, month };
        period.bounds()?;
        Ok(period)
    }

    pub fn range(from: NaiveDate, to: NaiveDate) -> Result<Self, SlipPeriodError> {
        let period = SlipPeriod::Range { from, to };
        period.bounds()?;
        Ok(period)
    }

    /// Parse a `YYYY-MM` month.
    pub fn parse_month(raw: &str) -> Result<Self, SlipPeriodError> {
        let malformed = || SlipPeriodError::MalformedMonth(raw.to_string());
        let (year, month) = raw.trim().split_once('-').ok_or_else(malformed)?;
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let month = month.parse::<u32>().map_err(|_| malformed())?;
        Self::month(year, month)
    }

    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), SlipPeriodError> {
        match *self {
            SlipPeriod::Month { year, month } => {
                let invalid = SlipPeriodError::InvalidMonth { year, month };
                let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;
                let last = first
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .ok_or(invalid)?;
                Ok((first, last))
            }
            SlipPeriod::Range { from, to } => {
                if from > to {
                    return Err(SlipPeriodError::InvertedRange { from, to });
                }
                Ok((from, to))
            }
        }
    }

    pub fn label(&self) -> String {
        match *self {
            SlipPeriod::Month { year, month } => u8::try_from(month)
                .ok()
                .and_then(|month| Month::try_from(month).ok())
                .map(|name| format!("{} {}", name.name(), year))
                .unwrap_or_else(|| format!("{year}-{month:02}")),
            SlipPeriod::Range { from, to } => format!("{from} to {to}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlipPeriodError {
    #[error("month must be formatted as YYYY-MM, got '{0}'")]
    MalformedMonth(String),
    #[error("{year}-{month} is not a calendar month")]
    InvalidMonth { year: i32, month: u32 },
    #[error("period start {from} is after its end {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySlip {
    pub staff_id: StaffId,
    pub name: String,
    pub days: usize,
    /// Earnings excluding bonus.
    pub amount: f64,
    pub bonus_qty: f64,
    pub bonus_amount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySlipBatch {
    pub period: SlipPeriod,
    pub label: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub slips: Vec<SalarySlip>,
    pub grand_total: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum SlipBuildError {
    #[error(transparent)]
    Period(#[from] SlipPeriodError),
    #[error(transparent)]
    Directory(#[from] RepositoryError),
}

impl SalarySlipBatch {
    /// Group the records falling inside `period` into one slip per staff member.
    pub fn build<D>(
        period: SlipPeriod,
        records: &[StaffRecord],
        directory: &D,
    ) -> Result<Self, SlipBuildError>
    where
        D: StaffDirectory + ?Sized,
    {
        let (from, to) = period.bounds()?;
        let mut grouped: BTreeMap<StaffId, SalarySlip> = BTreeMap::new();

        for record in records
            .iter()
            .filter(|record| record.date >= from && record.date <= to)
        {
            let slip = grouped
                .entry(record.staff_id.clone())
                .or_insert_with(|| SalarySlip {
                    staff_id: record.staff_id.clone(),
                    name: String::new(),
                    days: 0,
                    amount: 0.0,
                    bonus_qty: 0.0,
                    bonus_amount: 0.0,
                    total: 0.0,
                });

            slip.days += 1;
            slip.total += record.final_amount;
            slip.bonus_qty += record.bonus_qty;
            slip.bonus_amount += record.bonus_amount;
            slip.amount += (record.final_amount - record.bonus_amount).max(0.0);
        }

        let mut slips = Vec::with_capacity(grouped.len());
        for (staff_id, mut slip) in grouped {
            slip.name = directory
                .staff(&staff_id)?
                .map(|profile| profile.name)
                .unwrap_or_else(|| "Unknown".to_string());
            slips.push(slip);
        }
        slips.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.staff_id.cmp(&b.staff_id)));

        let grand_total = slips.iter().map(|slip| slip.total).sum();

        Ok(Self {
            period,
            label: period.label(),
            from,
            to,
            slips,
            grand_total,
        })
    }

    pub fn to_csv(&self) -> Result<String, SlipExportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(SLIP_CSV_HEADER)?;
        for slip in &self.slips {
            writer.serialize(SlipCsvRow {
                period: &self.label,
                staff_id: &slip.staff_id.0,
                name: &slip.name,
                days: slip.days,
                amount: slip.amount,
                bonus_qty: slip.bonus_qty,
                bonus_amount: slip.bonus_amount,
                total: slip.total,
            })?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| SlipExportError::Io(err.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

const SLIP_CSV_HEADER: [&str; 8] = [
    "period",
    "staff_id",
    "name",
    "days",
    "amount",
    "bonus_qty",
    "bonus_amount",
    "total",
];

#[derive(Serialize)]
struct SlipCsvRow<'a> {
    period: &'a str,
    staff_id: &'a str,
    name: &'a str,
    days: usize,
    amount: f64,
    bonus_qty: f64,
    bonus_amount: f64,
    total: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum SlipExportError {
    #[error("failed to encode salary slips: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush salary slips: {0}")]
    Io(#[from] std::io::Error),
    #[error("salary slip export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
