//! Date-effective rate configurations.
//!
//! Configurations are append-only: a new version supersedes older ones from its
//! effective date onwards and the latest version effective on or before a date is
//! the one in force. When nothing is effective yet, callers fall back to
//! [`BUILT_IN_RATES`] so payroll stays computable before any data entry.

mod book;
mod import;

pub use book::RateBook;
pub use import::{import_rate_configs, RateImportError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Monetary rates and thresholds applied to one day's production.
///
/// `on_target_pct` and `after_target_pct` are whole numbers applied as raw
/// multipliers (30 means "x30"), matching every historical record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub stitch_rate: f64,
    pub applique_rate: f64,
    pub on_target_pct: f64,
    pub after_target_pct: f64,
    pub pcs_per_round: u32,
    pub target_amount: f64,
    pub off_amount: f64,
    pub bonus_rate: f64,
    #[serde(default = "default_stitch_cap")]
    pub stitch_cap: f64,
}

/// Fallback used when no configuration is effective on the requested date.
pub const BUILT_IN_RATES: Rates = Rates {
    stitch_rate: 0.001,
    applique_rate: 1.111,
    on_target_pct: 30.0,
    after_target_pct: 34.0,
    pcs_per_round: 12,
    target_amount: 900.0,
    off_amount: 300.0,
    bonus_rate: 200.0,
    stitch_cap: 5000.0,
};

fn default_stitch_cap() -> f64 {
    BUILT_IN_RATES.stitch_cap
}

impl Default for Rates {
    fn default() -> Self {
        BUILT_IN_RATES
    }
}

impl Rates {
    pub fn validate(&self) -> Result<(), RateConfigError> {
        let amounts = [
            ("stitch_rate", self.stitch_rate),
            ("applique_rate", self.applique_rate),
            ("on_target_pct", self.on_target_pct),
            ("after_target_pct", self.after_target_pct),
            ("target_amount", self.target_amount),
            ("off_amount", self.off_amount),
            ("bonus_rate", self.bonus_rate),
            ("stitch_cap", self.stitch_cap),
        ];

        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(RateConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }

        if self.pcs_per_round == 0 {
            return Err(RateConfigError::Invalid {
                field: "pcs_per_round",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// A versioned configuration as entered by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    pub effective_date: NaiveDate,
    #[serde(flatten)]
    pub rates: Rates,
}

impl RateConfig {
    pub fn new(effective_date: NaiveDate, rates: Rates) -> Self {
        Self {
            effective_date,
            rates,
        }
    }
}

/// Where the rates frozen onto a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Configured,
    BuiltInDefault,
}

/// Value copy of the configuration resolved when a record was computed.
///
/// Records carry this by value and it is never re-derived from the store on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub source: RateSource,
    pub effective_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub rates: Rates,
}

impl RateSnapshot {
    pub fn configured(config: &RateConfig) -> Self {
        Self {
            source: RateSource::Configured,
            effective_date: Some(config.effective_date),
            rates: config.rates,
        }
    }

    pub fn built_in() -> Self {
        Self {
            source: RateSource::BuiltInDefault,
            effective_date: None,
            rates: BUILT_IN_RATES,
        }
    }
}

/// Storage seam for the configuration history.
pub trait RateConfigStore: Send + Sync {
    /// Latest configuration whose effective date is on or before `date`.
    fn resolve(&self, date: NaiveDate) -> Result<RateConfig, RateConfigError>;
    fn publish(&self, config: RateConfig) -> Result<RateConfig, RateConfigError>;
    /// Every version, ordered by effective date.
    fn history(&self) -> Result<Vec<RateConfig>, RateConfigError>;

    /// Resolve for `date`, absorbing `NoConfigAvailable` into the built-in rates.
    fn resolve_or_default(&self, date: NaiveDate) -> Result<RateSnapshot, RateConfigError> {
        match self.resolve(date) {
            Ok(config) => Ok(RateSnapshot::configured(&config)),
            Err(RateConfigError::NoConfigAvailable { date }) => {
                warn!(%date, "no rate configuration effective on date, using built-in rates");
                Ok(RateSnapshot::built_in())
            }
            Err(other) => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateConfigError {
    #[error("no rate configuration is effective on {date}")]
    NoConfigAvailable { date: NaiveDate },
    #[error("a rate configuration effective from {0} already exists")]
    DuplicateEffectiveDate(NaiveDate),
    #[error("invalid rate configuration: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("rate configuration store unavailable: {0}")]
    Unavailable(String),
}
