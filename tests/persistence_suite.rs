mod common;

use std::fs;

use common::{april_trio, date, money, setup_test_env, write_subscriptions};
use serde_json::Value;
use subscription_core::{
    billing::{BillingCycle, CancellationReminder, Subscription},
    errors::SubscriptionError,
    utils::persistence::load_subscriptions_from_file,
};

#[test]
fn snapshot_round_trip_preserves_subscriptions() {
    let (base, _) = setup_test_env();
    let mut subs = april_trio();
    subs[0].note = Some("family plan".into());
    subs[1].reminders.push(subscription_core::billing::Reminder { days_before: 2 });
    subs[2].cancellation_reminders.push(CancellationReminder {
        on: date(2025, 4, 25).and_hms_opt(18, 0, 0).unwrap(),
    });
    subs[2].deactivate(date(2025, 4, 30));

    let path = write_subscriptions(&base, &subs);
    let loaded = load_subscriptions_from_file(&path).unwrap();
    assert_eq!(loaded, subs);
}

#[test]
fn stored_records_use_decimal_strings_and_raw_intervals() {
    let (base, _) = setup_test_env();
    let subs = vec![
        Subscription::new("Music", BillingCycle::Monthly)
            .starting(date(2025, 1, 20))
            .with_cost(money(999)),
        Subscription::new("Coffee", BillingCycle::Custom(14)),
    ];
    let path = write_subscriptions(&base, &subs);

    let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["schema_version"], 1);
    let records = json["subscriptions"].as_array().unwrap();
    assert_eq!(records[0]["cost"], "9.99");
    assert_eq!(records[0]["billing"], 30.0);
    assert_eq!(records[0]["start_billing_date"], "2025-01-20");
    assert!((records[1]["billing"].as_f64().unwrap() - 14.1).abs() < 1e-9);
    assert!(records[1].get("cost").is_none());
}

#[test]
fn legacy_intervals_are_bucketed_on_load() {
    let (base, _) = setup_test_env();
    let path = base.join("legacy.json");
    fs::write(
        &path,
        r#"{
            "subscriptions": [
                {"id": "2f1c7f0e-8a4b-4d8e-9a59-5b8f7f6f1a01", "title": "Paper", "billing": 31},
                {"id": "2f1c7f0e-8a4b-4d8e-9a59-5b8f7f6f1a02", "title": "Box", "billing": 10},
                {"id": "2f1c7f0e-8a4b-4d8e-9a59-5b8f7f6f1a03", "title": "Club", "billing": 45.1},
                {"id": "2f1c7f0e-8a4b-4d8e-9a59-5b8f7f6f1a04", "title": "Blank"}
            ]
        }"#,
    )
    .unwrap();

    let loaded = load_subscriptions_from_file(&path).unwrap();
    let cycles: Vec<_> = loaded.iter().map(|sub| sub.cycle).collect();
    assert_eq!(
        cycles,
        vec![
            BillingCycle::Monthly,
            BillingCycle::Weekly,
            BillingCycle::Custom(45),
            BillingCycle::Monthly,
        ]
    );
    assert!(loaded.iter().all(|sub| sub.is_active));
}

#[test]
fn newer_schema_is_rejected() {
    let (base, _) = setup_test_env();
    let path = base.join("future.json");
    fs::write(&path, r#"{"schema_version": 9, "subscriptions": []}"#).unwrap();
    assert!(matches!(
        load_subscriptions_from_file(&path),
        Err(SubscriptionError::InvalidInput(_))
    ));
}

#[test]
fn malformed_file_reports_serialization_error() {
    let (base, _) = setup_test_env();
    let path = base.join("broken.json");
    fs::write(&path, "[1, 2").unwrap();
    assert!(matches!(
        load_subscriptions_from_file(&path),
        Err(SubscriptionError::Serde(_))
    ));
}
