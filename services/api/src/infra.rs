use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use stitch_payroll::config::PayrollConfig;
use stitch_payroll::error::AppError;
use stitch_payroll::payroll::{
    RateBook, RecordFilter, RecordId, RepositoryError, SlipPeriod, StaffDirectory, StaffId,
    StaffProfile, StaffRecord, StaffRecordRepository, StaffRecordService,
};
use tracing::info;

pub(crate) type PayrollService =
    StaffRecordService<InMemoryStaffRecords, InMemoryStaffDirectory, RateBook>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryStaffRecords {
    records: Arc<Mutex<HashMap<RecordId, StaffRecord>>>,
}

impl InMemoryStaffRecords {
    fn matching(&self, filter: &RecordFilter) -> Vec<StaffRecord> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.staff_id.cmp(&b.staff_id))
        });
        records
    }
}

impl StaffRecordRepository for InMemoryStaffRecords {
    fn insert(&self, record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let same_day = guard
            .values()
            .any(|existing| existing.staff_id == record.staff_id && existing.date == record.date);
        if same_day || guard.contains_key(&record.record_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.record_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: StaffRecord) -> Result<StaffRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let clash = guard.values().any(|existing| {
            existing.record_id != record.record_id
                && existing.staff_id == record.staff_id
                && existing.date == record.date
        });
        if clash {
            return Err(RepositoryError::Conflict);
        }
        match guard.get_mut(&record.record_id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(RepositoryError::NotFound),
        }
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
        Ok(self.matching(filter))
    }

    fn recent_for_staff(
        &self,
        staff_id: &StaffId,
        limit: usize,
    ) -> Result<Vec<StaffRecord>, RepositoryError> {
        let mut records = self.matching(&RecordFilter::for_staff(staff_id.clone()));
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryStaffDirectory {
    staff: Arc<Mutex<HashMap<StaffId, StaffProfile>>>,
}

impl InMemoryStaffDirectory {
    pub(crate) fn with_staff(profiles: impl IntoIterator<Item = StaffProfile>) -> Self {
        let staff = profiles
            .into_iter()
            .map(|profile| (profile.staff_id.clone(), profile))
            .collect();
        Self {
            staff: Arc::new(Mutex::new(staff)),
        }
    }

    /// Profiles ordered by name.
    pub(crate) fn roster(&self) -> Vec<StaffProfile> {
        let guard = self.staff.lock().expect("directory mutex poisoned");
        let mut profiles: Vec<_> = guard.values().cloned().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }
}

impl StaffDirectory for InMemoryStaffDirectory {
    fn staff(&self, staff_id: &StaffId) -> Result<Option<StaffProfile>, RepositoryError> {
        let guard = self.staff.lock().expect("directory mutex poisoned");
        Ok(guard.get(staff_id).cloned())
    }
}

/// Staff available to the in-memory service until a real directory is wired in.
pub(crate) fn demo_roster() -> Vec<StaffProfile> {
    vec![
        StaffProfile {
            staff_id: StaffId("stf-001".to_string()),
            name: "Ayesha Khan".to_string(),
            salary: None,
            joining_date: NaiveDate::from_ymd_opt(2026, 1, 5),
        },
        StaffProfile {
            staff_id: StaffId("stf-002".to_string()),
            name: "Imran Ali".to_string(),
            salary: None,
            joining_date: NaiveDate::from_ymd_opt(2025, 9, 15),
        },
        StaffProfile {
            staff_id: StaffId("stf-003".to_string()),
            name: "Nadia Shah".to_string(),
            salary: Some(32000.0),
            joining_date: NaiveDate::from_ymd_opt(2025, 6, 2),
        },
    ]
}

/// Rate history named by the configuration, or an empty book that prices at built-in rates.
pub(crate) fn load_rate_book(config: &PayrollConfig) -> Result<RateBook, AppError> {
    match &config.rate_config_csv {
        Some(path) => {
            let book = RateBook::from_csv_path(path)?;
            info!(
                path = %path.display(),
                versions = book.len(),
                "rate configuration history loaded"
            );
            Ok(book)
        }
        None => {
            info!("no rate configuration history configured, built-in rates apply");
            Ok(RateBook::new())
        }
    }
}

pub(crate) fn build_service(rates: RateBook) -> (Arc<PayrollService>, InMemoryStaffDirectory) {
    let directory = InMemoryStaffDirectory::with_staff(demo_roster());
    let service = StaffRecordService::new(
        Arc::new(InMemoryStaffRecords::default()),
        Arc::new(directory.clone()),
        Arc::new(rates),
    );
    (Arc::new(service), directory)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_month(raw: &str) -> Result<SlipPeriod, String> {
    SlipPeriod::parse_month(raw).map_err(|err| err.to_string())
}
