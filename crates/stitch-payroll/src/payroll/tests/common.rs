use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::payroll::domain::{
    Attendance, ProductionRow, RecordId, RecordInput, StaffId, StaffProfile,
};
use crate::payroll::rates::{RateBook, RateConfig, Rates, BUILT_IN_RATES};
use crate::payroll::repository::{
    RecordFilter, RepositoryError, StaffDirectory, StaffRecord, StaffRecordRepository,
};
use crate::payroll::{payroll_router, StaffRecordService};

pub(super) type MemoryService = StaffRecordService<MemoryRecords, MemoryDirectory, RateBook>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn piece_rate_staff() -> StaffProfile {
    StaffProfile {
        staff_id: StaffId("stf-piece".to_string()),
        name: "Bilal".to_string(),
        salary: None,
        joining_date: Some(date(2026, 1, 5)),
    }
}

pub(super) fn salaried_staff() -> StaffProfile {
    StaffProfile {
        staff_id: StaffId("stf-salary".to_string()),
        name: "Amina".to_string(),
        salary: Some(30000.0),
        joining_date: Some(date(2025, 11, 1)),
    }
}

/// Rates matching the worked examples: built-in values with cap 5000.
pub(super) fn scenario_rates() -> Rates {
    BUILT_IN_RATES
}

pub(super) fn day_input(staff: &StaffProfile, date: NaiveDate) -> RecordInput {
    let mut input = RecordInput::new(staff.staff_id.clone(), date, Attendance::Day);
    input.production = vec![ProductionRow::new(6000.0, 0.0, 100.0, 1.0)];
    input
}

pub(super) fn directory() -> MemoryDirectory {
    MemoryDirectory::with_staff([piece_rate_staff(), salaried_staff()])
}

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRecords>, Arc<RateBook>) {
    let records = Arc::new(MemoryRecords::default());
    let rates = Arc::new(RateBook::new());
    let service = StaffRecordService::new(records.clone(), Arc::new(directory()), rates.clone());
    (service, records, rates)
}

pub(super) fn configured_book(effective_date: NaiveDate, rates: Rates) -> RateBook {
    RateBook::with_history([RateConfig::new(effective_date, rates)]).expect("valid history")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRecords {
    pub(super) records: Arc<Mutex<HashMap<RecordId, StaffRecord>>>,
}

impl MemoryRecords {
    fn sorted(&self, filter: &RecordFilter) -> Vec<StaffRecord> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.record_id.cmp(&b.record_id)));
        records
    }
}

impl StaffRecordRepository for MemoryRecords {
    fn insert(&self, record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let taken = guard.values().any(|existing| {
            existing.staff_id == record.staff_id && existing.date == record.date
        });
        if taken || guard.contains_key(&record.record_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.record_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.record_id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.record_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<StaffRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_staff_date(
        &self,
        staff_id: &StaffId,
        date: NaiveDate,
    ) -> Result<Option<StaffRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| &record.staff_id == staff_id && record.date == date)
            .cloned())
    }

    fn delete(&self, id: &RecordId) -> Result<StaffRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }

    fn list(&self, filter: &RecordFilter) -> Result<Vec<StaffRecord>, RepositoryError> {
        Ok(self.sorted(filter))
    }

    fn recent_for_staff(
        &self,
        staff_id: &StaffId,
        limit: usize,
    ) -> Result<Vec<StaffRecord>, RepositoryError> {
        let mut records = self.sorted(&RecordFilter::for_staff(staff_id.clone()));
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    staff: Arc<Mutex<HashMap<StaffId, StaffProfile>>>,
}

impl MemoryDirectory {
    pub(super) fn with_staff(profiles: impl IntoIterator<Item = StaffProfile>) -> Self {
        let staff = profiles
            .into_iter()
            .map(|profile| (profile.staff_id.clone(), profile))
            .collect();
        Self {
            staff: Arc::new(Mutex::new(staff)),
        }
    }
}

impl StaffDirectory for MemoryDirectory {
    fn staff(&self, staff_id: &StaffId) -> Result<Option<StaffProfile>, RepositoryError> {
        let guard = self.staff.lock().expect("directory mutex poisoned");
        Ok(guard.get(staff_id).cloned())
    }
}

pub(super) struct ConflictRepository;

impl StaffRecordRepository for ConflictRepository {
    fn insert(&self, _record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &RecordId) -> Result<Option<StaffRecord>, RepositoryError> {
        Ok(None)
    }

    fn find_by_staff_date(
        &self,
        _staff_id: &StaffId,
        _date: NaiveDate,
    ) -> Result<Option<StaffRecord>, RepositoryError> {
        Ok(None)
    }

    fn delete(&self, _id: &RecordId) -> Result<StaffRecord, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn list(&self, _filter: &RecordFilter) -> Result<Vec<StaffRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn recent_for_staff(
        &self,
        _staff_id: &StaffId,
        _limit: usize,
    ) -> Result<Vec<StaffRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl StaffRecordRepository for UnavailableRepository {
    fn insert(&self, _record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RecordId) -> Result<Option<StaffRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_staff_date(
        &self,
        _staff_id: &StaffId,
        _date: NaiveDate,
    ) -> Result<Option<StaffRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &RecordId) -> Result<StaffRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &RecordFilter) -> Result<Vec<StaffRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent_for_staff(
        &self,
        _staff_id: &StaffId,
        _limit: usize,
    ) -> Result<Vec<StaffRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn payroll_router_with_service(service: MemoryService) -> axum::Router {
    payroll_router(Arc::new(service))
}
