use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rust_decimal::Decimal;
use subscription_core::{
    billing::{monthly_cost_remaining, next_occurrence, BillingCycle, Subscription},
    utils::persistence::{load_subscriptions_from_file, save_subscriptions_to_file},
};
use tempfile::tempdir;

const CYCLES: [BillingCycle; 7] = [
    BillingCycle::Daily,
    BillingCycle::Weekly,
    BillingCycle::Monthly,
    BillingCycle::Quarterly,
    BillingCycle::SemiAnnual,
    BillingCycle::Annual,
    BillingCycle::Custom(10),
];

fn build_sample_subscriptions(count: usize) -> Vec<Subscription> {
    let start_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (0..count)
        .map(|idx| {
            Subscription::new(format!("Subscription {idx}"), CYCLES[idx % CYCLES.len()])
                .starting(start_date + Duration::days((idx % 2_000) as i64))
                .with_cost(Decimal::new(499 + (idx % 1_000) as i64, 2))
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let subscriptions = build_sample_subscriptions(black_box(10_000));
    let reference = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();

    c.bench_function("monthly_cost_remaining_10k", |b| {
        b.iter(|| black_box(monthly_cost_remaining(&subscriptions, reference, false)))
    });

    c.bench_function("monthly_cost_full_month_10k", |b| {
        b.iter(|| black_box(monthly_cost_remaining(&subscriptions, reference, true)))
    });

    c.bench_function("next_occurrence_10k", |b| {
        b.iter(|| {
            for sub in &subscriptions {
                black_box(next_occurrence(sub, reference));
            }
        })
    });
}

fn bench_snapshot_io(c: &mut Criterion) {
    let subscriptions = build_sample_subscriptions(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("subscriptions.json");

    c.bench_function("subscriptions_save_10k", |b| {
        b.iter_batched(
            || subscriptions.clone(),
            |subs| save_subscriptions_to_file(&subs, &file_path).expect("save subscriptions"),
            BatchSize::LargeInput,
        )
    });

    save_subscriptions_to_file(&subscriptions, &file_path).expect("seed");

    c.bench_function("subscriptions_load_10k", |b| {
        b.iter(|| {
            let loaded = load_subscriptions_from_file(&file_path).expect("load subscriptions");
            black_box(loaded);
        })
    });
}

criterion_group!(benches, bench_aggregation, bench_snapshot_io);
criterion_main!(benches);
