//! Daily staff records: attendance, production, bonuses and the payable amount.
//!
//! Calculation is a pure pipeline (`calculation`) fed by a date-effective rate
//! configuration (`rates`). The `service` module wires it to the repository
//! seams and freezes the resolved configuration onto every persisted record.

pub mod calculation;
pub mod domain;
pub mod entry;
pub mod rates;
pub mod repository;
pub mod router;
pub mod service;
pub mod slips;

#[cfg(test)]
mod tests;

pub use calculation::{
    aggregate, calc_row, sync_pieces_rounds, BaseRule, BonusLine, BreakdownItem, CountEdit,
    DiscardedInputs, PayrollCalculation, PayrollEngine, ProductionLine, RecordTotals, RowAmounts,
    Settlement, TargetStatus,
};
pub use domain::{
    Attendance, DailyEntry, ProductionRow, RecordId, RecordInput, StaffId, StaffProfile,
    UnknownAttendance,
};
pub use entry::{next_record_date, suggest_attendance};
pub use rates::{
    import_rate_configs, RateBook, RateConfig, RateConfigError, RateConfigStore, RateImportError,
    RateSnapshot, RateSource, Rates, BUILT_IN_RATES,
};
pub use repository::{
    RecordFilter, RepositoryError, StaffDirectory, StaffRecord, StaffRecordDetail,
    StaffRecordRepository,
};
pub use router::payroll_router;
pub use service::{NextRecordDate, RecordPreview, RecordServiceError, StaffRecordService};
pub use slips::{
    SalarySlip, SalarySlipBatch, SlipBuildError, SlipExportError, SlipPeriod, SlipPeriodError,
};
