use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use tracing::info;

use super::{RateConfig, RateConfigError, RateConfigStore};

/// In-memory configuration history keyed by effective date.
#[derive(Debug, Default)]
pub struct RateBook {
    versions: RwLock<BTreeMap<NaiveDate, RateConfig>>,
}

impl RateBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a book from an existing history, validating every version.
    pub fn with_history(
        configs: impl IntoIterator<Item = RateConfig>,
    ) -> Result<Self, RateConfigError> {
        let mut versions = BTreeMap::new();
        for config in configs {
            config.rates.validate()?;
            if versions.insert(config.effective_date, config).is_some() {
                return Err(RateConfigError::DuplicateEffectiveDate(
                    config.effective_date,
                ));
            }
        }

        Ok(Self {
            versions: RwLock::new(versions),
        })
    }

    pub fn len(&self) -> usize {
        self.versions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> RateConfigError {
    RateConfigError::Unavailable("rate book lock poisoned".to_string())
}

impl RateConfigStore for RateBook {
    fn resolve(&self, date: NaiveDate) -> Result<RateConfig, RateConfigError> {
        let guard = self.versions.read().map_err(poisoned)?;
        guard
            .range(..=date)
            .next_back()
            .map(|(_, config)| *config)
            .ok_or(RateConfigError::NoConfigAvailable { date })
    }

    fn publish(&self, config: RateConfig) -> Result<RateConfig, RateConfigError> {
        config.rates.validate()?;

        let mut guard = self.versions.write().map_err(poisoned)?;
        if guard.contains_key(&config.effective_date) {
            return Err(RateConfigError::DuplicateEffectiveDate(
                config.effective_date,
            ));
        }
        guard.insert(config.effective_date, config);

        info!(effective_date = %config.effective_date, "rate configuration published");
        Ok(config)
    }

    fn history(&self) -> Result<Vec<RateConfig>, RateConfigError> {
        let guard = self.versions.read().map_err(poisoned)?;
        Ok(guard.values().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::rates::{RateSource, Rates, BUILT_IN_RATES};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn version(effective_date: NaiveDate, stitch_rate: f64) -> RateConfig {
        RateConfig::new(
            effective_date,
            Rates {
                stitch_rate,
                ..BUILT_IN_RATES
            },
        )
    }

    fn book() -> RateBook {
        RateBook::with_history([
            version(date(2026, 3, 1), 0.003),
            version(date(2026, 1, 1), 0.001),
            version(date(2026, 2, 1), 0.002),
        ])
        .expect("history is valid")
    }

    #[test]
    fn resolve_picks_latest_version_on_or_before_date() {
        let book = book();

        let exact = book.resolve(date(2026, 2, 1)).expect("resolves");
        assert_eq!(exact.rates.stitch_rate, 0.002);

        let between = book.resolve(date(2026, 2, 27)).expect("resolves");
        assert_eq!(between.effective_date, date(2026, 2, 1));

        let later = book.resolve(date(2027, 6, 15)).expect("resolves");
        assert_eq!(later.rates.stitch_rate, 0.003);
    }

    #[test]
    fn resolve_before_first_version_reports_missing_config() {
        let book = book();
        let err = book.resolve(date(2025, 12, 31)).expect_err("nothing effective");
        assert_eq!(
            err,
            RateConfigError::NoConfigAvailable {
                date: date(2025, 12, 31)
            }
        );
    }

    #[test]
    fn resolve_or_default_absorbs_missing_config() {
        let book = RateBook::new();
        let snapshot = book
            .resolve_or_default(date(2026, 1, 5))
            .expect("falls back");
        assert_eq!(snapshot.source, RateSource::BuiltInDefault);
        assert_eq!(snapshot.rates, BUILT_IN_RATES);
    }

    #[test]
    fn publish_rejects_duplicate_effective_date() {
        let book = book();
        let err = book
            .publish(version(date(2026, 2, 1), 0.004))
            .expect_err("versions are immutable");
        assert_eq!(err, RateConfigError::DuplicateEffectiveDate(date(2026, 2, 1)));
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn publish_validates_before_storing() {
        let book = RateBook::new();
        let invalid = RateConfig::new(
            date(2026, 4, 1),
            Rates {
                pcs_per_round: 0,
                ..BUILT_IN_RATES
            },
        );
        assert!(book.publish(invalid).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn history_is_ordered_by_effective_date() {
        let history = book().history().expect("history loads");
        let dates: Vec<_> = history.iter().map(|config| config.effective_date).collect();
        assert_eq!(
            dates,
            vec![date(2026, 1, 1), date(2026, 2, 1), date(2026, 3, 1)]
        );
    }
}
