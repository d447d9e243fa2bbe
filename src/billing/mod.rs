//! Billing cycle engine: cycles, calendar helpers, subscription records, and
//! occurrence queries.

pub mod calendar;
pub mod cycle;
pub mod engine;
pub mod subscription;

pub use calendar::{CalendarConfig, Clock, FixedClock, MonthWindow, SystemClock};
pub use cycle::BillingCycle;
pub use engine::{
    days_until_next, is_due_in_month, monthly_cost_remaining, next_occurrence,
    previous_bill_since_anchor, previous_occurrence, upcoming, BillingEngine,
};
pub use subscription::{
    current_subscriptions, BillingState, CancellationReminder, Reminder, Subscription,
};
