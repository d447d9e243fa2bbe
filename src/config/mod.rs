use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    billing::{calendar::start_of_month, CalendarConfig},
    errors::SubscriptionError,
    utils::paths,
};

const TMP_SUFFIX: &str = "tmp";
const DEFAULT_REMINDER_HOUR: u32 = 9;

/// User preferences persisted next to the subscription data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default = "Config::default_reminder_time")]
    pub reminder_time: NaiveTime,
    #[serde(default = "Config::default_price_in_reminders")]
    pub price_in_reminders: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<Decimal>,
    #[serde(default)]
    pub budget_active: bool,
    #[serde(default)]
    pub premium_unlocked: bool,
    /// First days of months in which a budget overage was dismissed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_budget_months: Vec<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            calendar: CalendarConfig::default(),
            reminder_time: Self::default_reminder_time(),
            price_in_reminders: true,
            monthly_budget: None,
            budget_active: false,
            premium_unlocked: false,
            ignored_budget_months: Vec::new(),
        }
    }
}

impl Config {
    fn default_reminder_time() -> NaiveTime {
        NaiveTime::from_hms_opt(DEFAULT_REMINDER_HOUR, 0, 0).unwrap_or_default()
    }

    fn default_price_in_reminders() -> bool {
        true
    }

    /// Dismisses the budget warning for the month containing `date`.
    pub fn ignore_budget_for(&mut self, date: NaiveDate) -> bool {
        let month = start_of_month(date);
        if self.ignored_budget_months.contains(&month) {
            return false;
        }
        self.ignored_budget_months.push(month);
        self.ignored_budget_months.sort();
        true
    }

    pub fn is_budget_ignored(&self, date: NaiveDate) -> bool {
        self.ignored_budget_months.contains(&start_of_month(date))
    }

    pub fn clear_ignored_budget_months(&mut self) {
        self.ignored_budget_months.clear();
    }
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, SubscriptionError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, SubscriptionError> {
        fs::create_dir_all(paths::config_dir_in(&base))?;
        Ok(Self {
            path: paths::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config, SubscriptionError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|source| SubscriptionError::Config {
                path: self.path.clone(),
                source,
            })
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), SubscriptionError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), SubscriptionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.reminder_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn save_and_reload_preserves_budget_settings() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config {
            monthly_budget: Some(Decimal::new(5000, 2)),
            budget_active: true,
            premium_unlocked: true,
            ..Config::default()
        };
        config.ignore_budget_for(NaiveDate::from_ymd_opt(2025, 4, 17).unwrap());
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.is_budget_ignored(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
        assert!(!loaded.is_budget_ignored(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()));
    }

    #[test]
    fn ignoring_same_month_twice_is_a_no_op() {
        let mut config = Config::default();
        assert!(config.ignore_budget_for(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap()));
        assert!(!config.ignore_budget_for(NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()));
        assert_eq!(config.ignored_budget_months.len(), 1);
        config.clear_ignored_budget_months();
        assert!(config.ignored_budget_months.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{not json").unwrap();
        let err = manager.load().unwrap_err();
        assert!(matches!(&err, SubscriptionError::Config { path, .. } if path == manager.path()));
        let source = std::error::Error::source(&err).expect("serde error kept as source");
        assert!(source.to_string().contains("line 1"));
    }
}
