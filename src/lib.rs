#![doc(test(attr(deny(warnings))))]

//! Subscription Core tracks recurring billing items: it derives upcoming and
//! past bill dates, month totals, budget overage, free-tier limits, and
//! reminder schedules for a collection of subscriptions.

pub mod billing;
pub mod budget;
pub mod cli;
pub mod config;
pub mod currency;
pub mod entitlement;
pub mod errors;
pub mod reminders;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Subscription Core tracing initialized.");
    });
}
