use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calculation::{
    breakdown, BreakdownItem, PayrollCalculation, ProductionLine, RecordTotals, TargetStatus,
};
use super::domain::{Attendance, RecordId, StaffId, StaffProfile};
use super::rates::RateSnapshot;

/// Persisted day record with its derived amounts and the rates it was priced at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub record_id: RecordId,
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub attendance: Attendance,
    pub production: Vec<ProductionLine>,
    pub totals: RecordTotals,
    pub bonus_qty: f64,
    pub bonus_rate: Option<f64>,
    pub applied_bonus_rate: f64,
    pub bonus_amount: f64,
    pub fix_amount: Option<f64>,
    pub base_amount: f64,
    pub salaried: bool,
    pub target_met: bool,
    pub is_fixed: bool,
    pub final_amount: f64,
    pub config_snapshot: RateSnapshot,
}

impl StaffRecord {
    pub fn from_calculation(
        record_id: RecordId,
        staff_id: StaffId,
        date: NaiveDate,
        calculation: PayrollCalculation,
        config_snapshot: RateSnapshot,
    ) -> Self {
        Self {
            record_id,
            staff_id,
            date,
            attendance: calculation.attendance,
            production: calculation.lines,
            totals: calculation.totals,
            bonus_qty: calculation.bonus.qty,
            bonus_rate: calculation.bonus_rate,
            applied_bonus_rate: calculation.bonus.applied_rate,
            bonus_amount: calculation.bonus.amount,
            fix_amount: calculation.fix_amount,
            base_amount: calculation.base_amount,
            salaried: calculation.salaried,
            target_met: calculation.target.target_met,
            is_fixed: calculation.settlement.is_fixed,
            final_amount: calculation.settlement.final_amount,
            config_snapshot,
        }
    }

    /// Tier status against the frozen rates, never the live configuration.
    pub fn target_status(&self) -> TargetStatus {
        TargetStatus::evaluate(&self.totals, &self.config_snapshot.rates)
    }

    pub fn breakdown(&self) -> Vec<BreakdownItem> {
        breakdown(
            self.base_amount,
            self.bonus_amount,
            self.fix_amount,
            self.salaried,
        )
    }

    pub fn detail(&self) -> StaffRecordDetail {
        StaffRecordDetail {
            record: self.clone(),
            target: self.target_status(),
            breakdown: self.breakdown(),
        }
    }
}

/// Read-only view served to detail screens.
#[derive(Debug, Clone, Serialize)]
pub struct StaffRecordDetail {
    #[serde(flatten)]
    pub record: StaffRecord,
    pub target: TargetStatus,
    pub breakdown: Vec<BreakdownItem>,
}

/// Listing criteria. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub staff_id: Option<StaffId>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn for_staff(staff_id: StaffId) -> Self {
        Self {
            staff_id: Some(staff_id),
            ..Self::default()
        }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            staff_id: None,
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn matches(&self, record: &StaffRecord) -> bool {
        self.staff_id
            .as_ref()
            .map_or(true, |staff_id| staff_id == &record.staff_id)
            && self.from.map_or(true, |from| record.date >= from)
            && self.to.map_or(true, |to| record.date <= to)
    }
}

/// Storage abstraction for staff records. Implementations enforce one record
/// per staff member per date.
pub trait StaffRecordRepository: Send + Sync {
    fn insert(&self, record: StaffRecord) -> Result<StaffRecord, RepositoryError>;
    fn update(&self, record: StaffRecord) -> Result<StaffRecord, RepositoryError>;
    fn fetch(&self, id: &RecordId) -> Result<Option<StaffRecord>, RepositoryError>;
    fn find_by_staff_date(
        &self,
        staff_id: &StaffId,
        date: NaiveDate,
    ) -> Result<Option<StaffRecord>, RepositoryError>;
    fn delete(&self, id: &RecordId) -> Result<StaffRecord, RepositoryError>;
    /// Matching records ordered by date.
    fn list(&self, filter: &RecordFilter) -> Result<Vec<StaffRecord>, RepositoryError>;
    /// Latest records of one staff member, newest first.
    fn recent_for_staff(
        &self,
        staff_id: &StaffId,
        limit: usize,
    ) -> Result<Vec<StaffRecord>, RepositoryError>;

    fn last_record_date(&self, staff_id: &StaffId) -> Result<Option<NaiveDate>, RepositoryError> {
        Ok(self
            .recent_for_staff(staff_id, 1)?
            .first()
            .map(|record| record.date))
    }
}

/// Lookup of staff members owned by the wider back office.
pub trait StaffDirectory: Send + Sync {
    fn staff(&self, staff_id: &StaffId) -> Result<Option<StaffProfile>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
