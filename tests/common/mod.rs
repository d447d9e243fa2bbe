#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use subscription_core::{
    billing::{BillingCycle, Subscription},
    config::ConfigManager,
    utils::persistence::save_subscriptions_to_file,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated data directory and a config manager rooted in it.
pub fn setup_test_env() -> (PathBuf, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (base, config_manager)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn billed(title: &str, cycle: BillingCycle, anchor: NaiveDate, cents: i64) -> Subscription {
    Subscription::new(title, cycle)
        .starting(anchor)
        .with_cost(money(cents))
}

/// Monthly subscriptions anchored on the 1st, 15th and 28th of April 2025.
pub fn april_trio() -> Vec<Subscription> {
    vec![
        billed("Cloud", BillingCycle::Monthly, date(2025, 4, 1), 1000),
        billed("Video", BillingCycle::Monthly, date(2025, 4, 15), 2000),
        billed("News", BillingCycle::Monthly, date(2025, 4, 28), 500),
    ]
}

pub fn write_subscriptions(base: &Path, subscriptions: &[Subscription]) -> PathBuf {
    let path = base.join("subscriptions.json");
    save_subscriptions_to_file(subscriptions, &path).expect("save subscriptions");
    path
}
