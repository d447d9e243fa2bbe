//! Reminder planning.
//!
//! Turns subscriptions and their reminder offsets into concrete notification
//! requests. Delivery belongs to the platform; this module only decides what
//! should fire, when, and with which text.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    billing::{current_subscriptions, BillingEngine, CalendarConfig, Subscription},
    config::Config,
    currency::{format_currency_value, CurrencyCode, LocaleConfig},
};

const NEXT_BILL_TITLE: &str = "Upcoming subscription charge";
const CANCELLATION_TITLE: &str = "Cancel subscription";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    NextBill,
    Cancellation,
}

impl NotificationKind {
    /// Identifier used to group notifications of the same kind.
    pub fn thread_identifier(self) -> &'static str {
        match self {
            NotificationKind::NextBill => "next-bill",
            NotificationKind::Cancellation => "cancellation",
        }
    }
}

/// A single notification the platform should schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedNotification {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub kind: NotificationKind,
    /// Wall-clock time in the working calendar.
    pub fire_at: NaiveDateTime,
    pub fire_at_utc: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ReminderOptions {
    pub delivery_time: NaiveTime,
    pub include_price: bool,
    pub currency: CurrencyCode,
    pub locale: LocaleConfig,
    pub calendar: CalendarConfig,
}

impl ReminderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delivery_time: config.reminder_time,
            include_price: config.price_in_reminders,
            currency: CurrencyCode::new(config.currency.as_str()),
            locale: LocaleConfig::for_tag(&config.locale),
            calendar: config.calendar,
        }
    }
}

/// Human phrase for "N days before".
pub fn relative_day_phrase(days_before: u32) -> String {
    match days_before {
        0 => "today".into(),
        1 => "tomorrow".into(),
        2 => "the day after tomorrow".into(),
        n => format!("in {n} days"),
    }
}

fn medium_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub struct ReminderPlanner {
    options: ReminderOptions,
}

impl ReminderPlanner {
    pub fn new(options: ReminderOptions) -> Self {
        Self { options }
    }

    /// Plans every notification that still lies ahead of `now`, earliest first.
    pub fn plan(
        &self,
        subscriptions: &[Subscription],
        now: DateTime<Utc>,
    ) -> Vec<PlannedNotification> {
        let engine = BillingEngine::new(self.options.calendar);
        let today = engine.today(now);
        let mut planned = Vec::new();

        for subscription in current_subscriptions(subscriptions, today) {
            let Some(next_bill) = engine.next_occurrence(subscription, now) else {
                continue;
            };
            for reminder in &subscription.reminders {
                let offset = Duration::days(reminder.days_before as i64);
                let Some(day) = next_bill.checked_sub_signed(offset) else {
                    continue;
                };
                let fire_at = day.and_time(self.options.delivery_time);
                let body = self.next_bill_body(subscription, reminder.days_before);
                let kind = NotificationKind::NextBill;
                self.push(&mut planned, subscription, kind, fire_at, now, body);
            }
            for reminder in &subscription.cancellation_reminders {
                let body = cancellation_body(subscription, next_bill);
                let kind = NotificationKind::Cancellation;
                self.push(&mut planned, subscription, kind, reminder.on, now, body);
            }
        }

        planned.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.body.cmp(&b.body)));
        tracing::debug!(count = planned.len(), "planned reminder notifications");
        planned
    }

    fn push(
        &self,
        planned: &mut Vec<PlannedNotification>,
        subscription: &Subscription,
        kind: NotificationKind,
        fire_at: NaiveDateTime,
        now: DateTime<Utc>,
        body: String,
    ) {
        let fire_at_utc = self.options.calendar.to_utc(fire_at);
        if fire_at_utc < now {
            return;
        }
        let title = match kind {
            NotificationKind::NextBill => NEXT_BILL_TITLE,
            NotificationKind::Cancellation => CANCELLATION_TITLE,
        };
        planned.push(PlannedNotification {
            id: Uuid::new_v4(),
            subscription_id: subscription.id,
            kind,
            fire_at,
            fire_at_utc,
            title: title.to_string(),
            body,
        });
    }

    fn next_bill_body(&self, subscription: &Subscription, days_before: u32) -> String {
        let when = relative_day_phrase(days_before);
        let title = subscription.title.trim();
        if title.is_empty() {
            return format!("One of your subscriptions will be charged {when}.");
        }
        match subscription.cost.filter(|_| self.options.include_price) {
            Some(cost) => {
                let price =
                    format_currency_value(cost, &self.options.currency, &self.options.locale);
                format!("Your {title} subscription for {price} will be charged {when}.")
            }
            None => format!("Your {title} subscription will be charged {when}."),
        }
    }
}

fn cancellation_body(subscription: &Subscription, next_bill: NaiveDate) -> String {
    let title = subscription.title.trim();
    match (subscription.deactivation_date, title.is_empty()) {
        (Some(deadline), false) => format!(
            "You should cancel your {title} subscription before {}.",
            medium_date(deadline)
        ),
        (_, false) => format!(
            "You should cancel your {title} soon. Your next charge will be on {}.",
            medium_date(next_bill)
        ),
        (_, true) => format!(
            "You should cancel one of your subscriptions soon. Your next charge will be on {}.",
            medium_date(next_bill)
        ),
    }
}
