//! Staff production and payroll calculation for an embroidery shop.
//!
//! The [`payroll`] module owns the calculation engine, the versioned rate
//! configuration store and the staff record lifecycle. `config`, `error` and
//! `telemetry` carry the service plumbing shared with the API binary.

pub mod config;
pub mod error;
pub mod payroll;
pub mod telemetry;
