use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{RateBook, RateConfig, RateConfigError, RateConfigStore, Rates, BUILT_IN_RATES};

#[derive(Debug, thiserror::Error)]
pub enum RateImportError {
    #[error("failed to read rate configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rate configuration CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("rate configuration on line {line} rejected: {source}")]
    Invalid { line: u64, source: RateConfigError },
}

/// Parse and validate a configuration history with one version per row.
///
/// The `stitch_cap` column is optional and defaults to the built-in cap. Rows with
/// invalid rates or a repeated effective date are rejected with their line number.
pub fn import_rate_configs<R: Read>(reader: R) -> Result<Vec<RateConfig>, RateImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut configs: Vec<RateConfig> = Vec::new();
    let mut seen = BTreeSet::new();

    for (index, record) in csv_reader.deserialize::<RateRow>().enumerate() {
        // header occupies line 1
        let line = index as u64 + 2;
        let config = record?.into_config();

        config
            .rates
            .validate()
            .map_err(|source| RateImportError::Invalid { line, source })?;
        if !seen.insert(config.effective_date) {
            return Err(RateImportError::Invalid {
                line,
                source: RateConfigError::DuplicateEffectiveDate(config.effective_date),
            });
        }

        configs.push(config);
    }

    Ok(configs)
}

impl RateBook {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, RateImportError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RateImportError> {
        let book = RateBook::new();
        for (index, config) in import_rate_configs(reader)?.into_iter().enumerate() {
            let line = index as u64 + 2;
            book.publish(config)
                .map_err(|source| RateImportError::Invalid { line, source })?;
        }
        Ok(book)
    }
}

#[derive(Debug, Deserialize)]
struct RateRow {
    effective_date: NaiveDate,
    stitch_rate: f64,
    applique_rate: f64,
    on_target_pct: f64,
    after_target_pct: f64,
    pcs_per_round: u32,
    target_amount: f64,
    off_amount: f64,
    bonus_rate: f64,
    #[serde(default)]
    stitch_cap: Option<f64>,
}

impl RateRow {
    fn into_config(self) -> RateConfig {
        RateConfig::new(
            self.effective_date,
            Rates {
                stitch_rate: self.stitch_rate,
                applique_rate: self.applique_rate,
                on_target_pct: self.on_target_pct,
                after_target_pct: self.after_target_pct,
                pcs_per_round: self.pcs_per_round,
                target_amount: self.target_amount,
                off_amount: self.off_amount,
                bonus_rate: self.bonus_rate,
                stitch_cap: self.stitch_cap.unwrap_or(BUILT_IN_RATES.stitch_cap),
            },
        )
    }
}
