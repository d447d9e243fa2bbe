use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cycle::BillingCycle;

/// A recurring billing item recorded by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_billing_date: Option<NaiveDate>,
    #[serde(rename = "billing", default)]
    pub cycle: BillingCycle,
    #[serde(default = "Subscription::default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivation_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<Reminder>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cancellation_reminders: Vec<CancellationReminder>,
}

/// "Remind me N days before the next charge."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub days_before: u32,
}

/// Reminder to cancel, fired at a fixed wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationReminder {
    pub on: NaiveDateTime,
}

/// Outcome of the billing precondition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingState {
    Billable { anchor: NaiveDate, cost: Decimal },
    /// No anchor date, or a cost that is absent or not positive.
    Inactive,
}

impl Subscription {
    pub fn new(title: impl Into<String>, cycle: BillingCycle) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            cost: None,
            start_billing_date: None,
            cycle,
            is_active: true,
            deactivation_date: None,
            note: None,
            reminders: Vec::new(),
            cancellation_reminders: Vec::new(),
        }
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_billing_date = Some(date);
        self
    }

    pub fn remind_days_before(mut self, days_before: u32) -> Self {
        self.reminders.push(Reminder { days_before });
        self
    }

    pub fn billing_state(&self) -> BillingState {
        match (self.start_billing_date, self.cost) {
            (Some(anchor), Some(cost)) if cost > Decimal::ZERO => {
                BillingState::Billable { anchor, cost }
            }
            _ => BillingState::Inactive,
        }
    }

    /// Active, or deactivated with a deactivation date still ahead of `today`.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.is_active || self.deactivation_date.is_some_and(|date| date > today)
    }

    /// Pauses the subscription as of `on`.
    pub fn deactivate(&mut self, on: NaiveDate) {
        self.is_active = false;
        self.deactivation_date = Some(on);
    }

    pub fn reactivate(&mut self) {
        self.is_active = true;
        self.deactivation_date = None;
    }

    fn default_active() -> bool {
        true
    }
}

/// Subscriptions that should be fed to the engine on `today`.
pub fn current_subscriptions(
    subscriptions: &[Subscription],
    today: NaiveDate,
) -> impl Iterator<Item = &Subscription> {
    subscriptions.iter().filter(move |sub| sub.is_current(today))
}
