use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::calculation::{BreakdownItem, PayrollCalculation, PayrollEngine};
use super::domain::{Attendance, RecordId, RecordInput, StaffId, StaffProfile};
use super::entry::{next_record_date, suggest_attendance};
use super::rates::{RateConfig, RateConfigError, RateConfigStore, RateSnapshot};
use super::repository::{
    RecordFilter, RepositoryError, StaffDirectory, StaffRecord, StaffRecordRepository,
};
use super::slips::{SalarySlipBatch, SlipBuildError, SlipPeriod};

/// Orchestrates the record lifecycle: resolve rates for the date, run the
/// engine, freeze the rates onto the record and persist it.
pub struct StaffRecordService<R, D, C> {
    records: Arc<R>,
    directory: Arc<D>,
    rates: Arc<C>,
    sequence: AtomicU64,
}

/// Computed record that has not been persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPreview {
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub config: RateSnapshot,
    pub calculation: PayrollCalculation,
    pub breakdown: Vec<BreakdownItem>,
}

/// Form pre-fill for a staff member's next entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextRecordDate {
    pub staff_id: StaffId,
    pub joining_date: Option<NaiveDate>,
    pub last_record_date: Option<NaiveDate>,
    pub next_date: Option<NaiveDate>,
    pub suggested_attendance: Option<Attendance>,
}

impl<R, D, C> StaffRecordService<R, D, C>
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    pub fn new(records: Arc<R>, directory: Arc<D>, rates: Arc<C>) -> Self {
        Self {
            records,
            directory,
            rates,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_record_id(&self) -> RecordId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        RecordId(format!("rec-{id:06}"))
    }

    fn profile(&self, staff_id: &StaffId) -> Result<StaffProfile, RecordServiceError> {
        self.directory
            .staff(staff_id)?
            .ok_or_else(|| RecordServiceError::StaffNotFound(staff_id.clone()))
    }

    fn compute(
        &self,
        input: &RecordInput,
    ) -> Result<(RateSnapshot, PayrollCalculation), RecordServiceError> {
        let profile = self.profile(&input.staff_id)?;
        let snapshot = self.rates.resolve_or_default(input.date)?;
        let calculation =
            PayrollEngine::new(snapshot.rates).calculate(&input.entry(), profile.monthly_salary());

        if calculation.discarded.any() {
            debug!(
                staff_id = %input.staff_id,
                date = %input.date,
                attendance = %input.attendance,
                discarded = ?calculation.discarded,
                "inputs not accepted for attendance were dropped"
            );
        }

        Ok((snapshot, calculation))
    }

    fn ensure_date_free(
        &self,
        staff_id: &StaffId,
        date: NaiveDate,
        editing: Option<&RecordId>,
    ) -> Result<(), RecordServiceError> {
        match self.records.find_by_staff_date(staff_id, date)? {
            Some(existing) if Some(&existing.record_id) != editing => {
                Err(RecordServiceError::DuplicateRecord {
                    staff_id: staff_id.clone(),
                    date,
                    existing: Some(existing.record_id),
                })
            }
            _ => Ok(()),
        }
    }

    /// Run the full calculation without persisting anything.
    pub fn preview(&self, input: &RecordInput) -> Result<RecordPreview, RecordServiceError> {
        let (config, calculation) = self.compute(input)?;
        Ok(RecordPreview {
            staff_id: input.staff_id.clone(),
            date: input.date,
            config,
            breakdown: calculation.breakdown(),
            calculation,
        })
    }

    pub fn create(&self, input: RecordInput) -> Result<StaffRecord, RecordServiceError> {
        self.ensure_date_free(&input.staff_id, input.date, None)?;
        let (snapshot, calculation) = self.compute(&input)?;

        let record = StaffRecord::from_calculation(
            self.next_record_id(),
            input.staff_id.clone(),
            input.date,
            calculation,
            snapshot,
        );

        let stored = self.records.insert(record).map_err(|err| match err {
            RepositoryError::Conflict => RecordServiceError::DuplicateRecord {
                staff_id: input.staff_id.clone(),
                date: input.date,
                existing: None,
            },
            other => other.into(),
        })?;

        info!(
            record_id = %stored.record_id,
            staff_id = %stored.staff_id,
            date = %stored.date,
            final_amount = stored.final_amount,
            "staff record created"
        );
        Ok(stored)
    }

    /// Replace a record's inputs. Rates are re-resolved for the (possibly new) date.
    pub fn update(
        &self,
        record_id: &RecordId,
        input: RecordInput,
    ) -> Result<StaffRecord, RecordServiceError> {
        self.get(record_id)?;
        self.ensure_date_free(&input.staff_id, input.date, Some(record_id))?;
        let (snapshot, calculation) = self.compute(&input)?;

        let record = StaffRecord::from_calculation(
            record_id.clone(),
            input.staff_id.clone(),
            input.date,
            calculation,
            snapshot,
        );

        let stored = self.records.update(record).map_err(|err| match err {
            RepositoryError::NotFound => RecordServiceError::RecordNotFound(record_id.clone()),
            RepositoryError::Conflict => RecordServiceError::DuplicateRecord {
                staff_id: input.staff_id.clone(),
                date: input.date,
                existing: None,
            },
            other => other.into(),
        })?;

        info!(
            record_id = %stored.record_id,
            date = %stored.date,
            final_amount = stored.final_amount,
            "staff record updated"
        );
        Ok(stored)
    }

    pub fn get(&self, record_id: &RecordId) -> Result<StaffRecord, RecordServiceError> {
        self.records
            .fetch(record_id)?
            .ok_or_else(|| RecordServiceError::RecordNotFound(record_id.clone()))
    }

    pub fn delete(&self, record_id: &RecordId) -> Result<StaffRecord, RecordServiceError> {
        let removed = self.records.delete(record_id).map_err(|err| match err {
            RepositoryError::NotFound => RecordServiceError::RecordNotFound(record_id.clone()),
            other => other.into(),
        })?;

        info!(record_id = %removed.record_id, "staff record deleted");
        Ok(removed)
    }

    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<StaffRecord>, RecordServiceError> {
        Ok(self.records.list(filter)?)
    }

    pub fn next_record_date(
        &self,
        staff_id: &StaffId,
    ) -> Result<NextRecordDate, RecordServiceError> {
        let profile = self.profile(staff_id)?;
        let last_record_date = self.records.last_record_date(staff_id)?;
        let recent = self.records.recent_for_staff(staff_id, 2)?;
        let next_date = next_record_date(profile.joining_date, last_record_date);

        let history: Vec<Attendance> = recent.iter().map(|record| record.attendance).collect();
        let suggested_attendance = next_date.and_then(|date| suggest_attendance(date, &history));

        Ok(NextRecordDate {
            staff_id: staff_id.clone(),
            joining_date: profile.joining_date,
            last_record_date,
            next_date,
            suggested_attendance,
        })
    }

    pub fn rates_for(&self, date: NaiveDate) -> Result<RateSnapshot, RecordServiceError> {
        Ok(self.rates.resolve_or_default(date)?)
    }

    pub fn publish_rates(&self, config: RateConfig) -> Result<RateConfig, RecordServiceError> {
        Ok(self.rates.publish(config)?)
    }

    pub fn rate_history(&self) -> Result<Vec<RateConfig>, RecordServiceError> {
        Ok(self.rates.history()?)
    }

    pub fn salary_slips(&self, period: SlipPeriod) -> Result<SalarySlipBatch, RecordServiceError> {
        let (from, to) = period.bounds().map_err(SlipBuildError::from)?;
        let records = self.records.list(&RecordFilter::between(from, to))?;
        Ok(SalarySlipBatch::build(period, &records, self.directory.as_ref())?)
    }
}

/// Error raised by the staff record service.
#[derive(Debug, thiserror::Error)]
pub enum RecordServiceError {
    #[error("staff {staff_id} already has a record on {date}")]
    DuplicateRecord {
        staff_id: StaffId,
        date: NaiveDate,
        existing: Option<RecordId>,
    },
    #[error("staff record {0} not found")]
    RecordNotFound(RecordId),
    #[error("staff member {0} not found")]
    StaffNotFound(StaffId),
    #[error(transparent)]
    Rates(#[from] RateConfigError),
    #[error(transparent)]
    Slips(#[from] SlipBuildError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
