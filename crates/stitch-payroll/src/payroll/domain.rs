use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for staff members owned by the staff directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub String);

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for persisted staff records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Daily attendance category. Governs whether production and bonus apply and
/// which base-amount rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attendance {
    Day,
    Night,
    Half,
    Absent,
    Off,
    Close,
    Sunday,
}

impl Attendance {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Day,
            Self::Night,
            Self::Half,
            Self::Absent,
            Self::Off,
            Self::Close,
            Self::Sunday,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Night => "Night",
            Self::Half => "Half",
            Self::Absent => "Absent",
            Self::Off => "Off",
            Self::Close => "Close",
            Self::Sunday => "Sunday",
        }
    }

    /// Production rows are only recorded on working shifts.
    pub const fn allows_production(self) -> bool {
        !matches!(self, Self::Absent | Self::Off | Self::Close | Self::Sunday)
    }

    /// Bonus lines and the fixed-amount override share the same gate.
    pub const fn allows_bonus(self) -> bool {
        !matches!(self, Self::Absent | Self::Close)
    }

    pub const fn allows_fix_amount(self) -> bool {
        self.allows_bonus()
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attendance '{0}' (expected one of Day, Night, Half, Absent, Off, Close, Sunday)")]
pub struct UnknownAttendance(pub String);

impl FromStr for Attendance {
    type Err = UnknownAttendance;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|attendance| attendance.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownAttendance(trimmed.to_string()))
    }
}

/// What the payroll engine needs to know about a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub staff_id: StaffId,
    pub name: String,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
}

impl StaffProfile {
    /// Monthly salary when the staff member is salaried; piece-rate staff yield `None`.
    pub fn monthly_salary(&self) -> Option<f64> {
        self.salary
            .filter(|salary| salary.is_finite() && *salary > 0.0)
    }
}

/// One line of a day's production. Blank or malformed counts read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionRow {
    #[serde(default, alias = "d_stitch", deserialize_with = "lenient_count")]
    pub daily_stitch_count: f64,
    #[serde(default, alias = "applique", deserialize_with = "lenient_count")]
    pub applique_count: f64,
    #[serde(default, alias = "pcs", deserialize_with = "lenient_count")]
    pub piece_count: f64,
    #[serde(default, alias = "rounds", deserialize_with = "lenient_count")]
    pub round_count: f64,
}

impl ProductionRow {
    pub fn new(
        daily_stitch_count: f64,
        applique_count: f64,
        piece_count: f64,
        round_count: f64,
    ) -> Self {
        Self {
            daily_stitch_count,
            applique_count,
            piece_count,
            round_count,
        }
        .sanitized()
    }

    /// Copy with every count coerced to a finite, non-negative number.
    pub fn sanitized(self) -> Self {
        Self {
            daily_stitch_count: sanitize_count(self.daily_stitch_count),
            applique_count: sanitize_count(self.applique_count),
            piece_count: sanitize_count(self.piece_count),
            round_count: sanitize_count(self.round_count),
        }
    }

    pub fn is_blank(&self) -> bool {
        let row = self.sanitized();
        row.daily_stitch_count == 0.0
            && row.applique_count == 0.0
            && row.piece_count == 0.0
            && row.round_count == 0.0
    }
}

/// The user-entered part of a day's record, before any policy is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub attendance: Attendance,
    #[serde(default)]
    pub production: Vec<ProductionRow>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub bonus_qty: f64,
    /// Per-unit override; `None` falls back to the configuration default.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub bonus_rate: Option<f64>,
    /// Final payable override; `None` means "use the calculated amount".
    #[serde(default, deserialize_with = "lenient_amount")]
    pub fix_amount: Option<f64>,
}

impl DailyEntry {
    pub fn new(attendance: Attendance) -> Self {
        Self {
            attendance,
            production: Vec::new(),
            bonus_qty: 0.0,
            bonus_rate: None,
            fix_amount: None,
        }
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = ProductionRow>) -> Self {
        self.production = rows.into_iter().collect();
        self
    }

    pub fn with_bonus(mut self, qty: f64, rate: Option<f64>) -> Self {
        self.bonus_qty = qty;
        self.bonus_rate = rate;
        self
    }

    pub fn with_fix_amount(mut self, amount: f64) -> Self {
        self.fix_amount = Some(amount);
        self
    }
}

/// Request to create or edit the record of one staff member for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInput {
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub attendance: Attendance,
    #[serde(default)]
    pub production: Vec<ProductionRow>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub bonus_qty: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub bonus_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub fix_amount: Option<f64>,
}

impl RecordInput {
    pub fn new(staff_id: StaffId, date: NaiveDate, attendance: Attendance) -> Self {
        Self {
            staff_id,
            date,
            attendance,
            production: Vec::new(),
            bonus_qty: 0.0,
            bonus_rate: None,
            fix_amount: None,
        }
    }

    pub fn entry(&self) -> DailyEntry {
        DailyEntry {
            attendance: self.attendance,
            production: self.production.clone(),
            bonus_qty: self.bonus_qty,
            bonus_rate: self.bonus_rate,
            fix_amount: self.fix_amount,
        }
    }
}

pub(crate) fn sanitize_count(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LenientNumber {
    fn parse(self) -> Option<f64> {
        match self {
            LenientNumber::Number(value) => Some(value),
            LenientNumber::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
            LenientNumber::Other(_) => None,
        }
        .filter(|value| value.is_finite())
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(sanitize_count(
        raw.and_then(LenientNumber::parse).unwrap_or(0.0),
    ))
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(LenientNumber::parse))
}
