//! Occurrence math over billing cycles.
//!
//! Every function here is pure: it reads the subscription and a reference day
//! and never mutates either. A subscription without an anchor date or with a
//! non-positive cost never occurs, and yields `None`, `false`, or zero.
//!
//! Occurrence `k` of a subscription is `anchor + k * step` where the step is a
//! number of days (daily, weekly, custom) or calendar months (monthly,
//! quarterly, semi-annual, annual). Month steps clamp to the last day of the
//! target month. Monthly, quarterly, semi-annual and custom series start at
//! their anchor. Weekly and annual series only borrow the anchor's weekday or
//! calendar day, so they extend before the anchor as well. Daily is due every
//! day.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::{
    calendar::{months_between, shift_months, CalendarConfig, MonthWindow},
    cycle::BillingCycle,
    subscription::{BillingState, Subscription},
};

enum Step {
    Days(i64),
    Months(i64),
}

fn step_for(cycle: BillingCycle) -> Step {
    match cycle.months() {
        Some(months) => Step::Months(months as i64),
        None => Step::Days(cycle.days().unwrap_or(1) as i64),
    }
}

fn occurrence(anchor: NaiveDate, step: &Step, index: i64) -> Option<NaiveDate> {
    match step {
        Step::Days(days) => anchor.checked_add_signed(Duration::days(days.checked_mul(index)?)),
        Step::Months(months) => shift_months(anchor, months.checked_mul(index)?),
    }
}

/// Weekly and annual cycles align to the anchor in both directions.
fn aligned_both_ways(cycle: BillingCycle) -> bool {
    matches!(cycle, BillingCycle::Weekly | BillingCycle::Annual)
}

/// Index of the last occurrence on or before `today`; negative when the anchor
/// lies after `today`.
fn last_index_on_or_before(anchor: NaiveDate, step: &Step, today: NaiveDate) -> Option<i64> {
    match step {
        Step::Days(days) => Some((today - anchor).num_days().div_euclid(*days)),
        Step::Months(months) => {
            let index = months_between(anchor, today).div_euclid(*months);
            if occurrence(anchor, step, index)? > today {
                Some(index - 1)
            } else {
                Some(index)
            }
        }
    }
}

/// First billing day on or after `today`.
pub fn next_occurrence(subscription: &Subscription, today: NaiveDate) -> Option<NaiveDate> {
    let BillingState::Billable { anchor, .. } = subscription.billing_state() else {
        return None;
    };
    if subscription.cycle == BillingCycle::Daily {
        return Some(today);
    }
    if anchor >= today && !aligned_both_ways(subscription.cycle) {
        return Some(anchor);
    }
    let step = step_for(subscription.cycle);
    let index = last_index_on_or_before(anchor, &step, today)?;
    let candidate = occurrence(anchor, &step, index)?;
    if candidate >= today {
        Some(candidate)
    } else {
        occurrence(anchor, &step, index + 1)
    }
}

/// Latest billing day on or before `today`.
///
/// The daily cycle reports yesterday. Monthly, quarterly, semi-annual and
/// custom cycles report `None` while the anchor still lies in the future.
pub fn previous_occurrence(subscription: &Subscription, today: NaiveDate) -> Option<NaiveDate> {
    let BillingState::Billable { anchor, .. } = subscription.billing_state() else {
        return None;
    };
    if subscription.cycle == BillingCycle::Daily {
        return today.pred_opt();
    }
    if anchor > today && !aligned_both_ways(subscription.cycle) {
        return None;
    }
    let step = step_for(subscription.cycle);
    let index = last_index_on_or_before(anchor, &step, today)?;
    occurrence(anchor, &step, index)
}

/// Whether the subscription bills inside the month window around `reference`.
///
/// Partial mode only looks at the next occurrence between `reference` and the
/// month end. Full mode also accepts a previous occurrence earlier in the month.
pub fn is_due_in_month(
    subscription: &Subscription,
    reference: NaiveDate,
    full_month: bool,
) -> bool {
    let window = MonthWindow::for_reference(reference, full_month);
    let upcoming = next_occurrence(subscription, reference).is_some_and(|d| window.contains(d));
    if upcoming || !full_month {
        return upcoming;
    }
    previous_occurrence(subscription, reference).is_some_and(|d| window.contains(d))
}

/// Sum of costs of all subscriptions due in the month window around `reference`.
pub fn monthly_cost_remaining<'a, I>(
    subscriptions: I,
    reference: NaiveDate,
    full_month: bool,
) -> Decimal
where
    I: IntoIterator<Item = &'a Subscription>,
{
    let mut total = Decimal::ZERO;
    for subscription in subscriptions {
        match subscription.billing_state() {
            BillingState::Billable { cost, .. } => {
                if is_due_in_month(subscription, reference, full_month) {
                    total += cost;
                }
            }
            BillingState::Inactive => {
                tracing::debug!(
                    id = %subscription.id,
                    "skipping subscription without billing data"
                );
            }
        }
    }
    total
}

/// Whole days from `today` until the next billing day.
pub fn days_until_next(subscription: &Subscription, today: NaiveDate) -> Option<i64> {
    next_occurrence(subscription, today).map(|next| (next - today).num_days())
}

/// Previous billing day, hidden when it would precede the first recorded charge.
pub fn previous_bill_since_anchor(
    subscription: &Subscription,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let previous = previous_occurrence(subscription, today)?;
    let anchor = subscription.start_billing_date?;
    (previous >= anchor).then_some(previous)
}

/// Billable subscriptions paired with their next billing day, soonest first.
pub fn upcoming<'a, I>(subscriptions: I, today: NaiveDate) -> Vec<(&'a Subscription, NaiveDate)>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    let mut due: Vec<_> = subscriptions
        .into_iter()
        .filter_map(|sub| next_occurrence(sub, today).map(|next| (sub, next)))
        .collect();
    due.sort_by(|(a, a_next), (b, b_next)| a_next.cmp(b_next).then_with(|| a.title.cmp(&b.title)));
    due
}

/// Billing operations bound to a working calendar, keyed by instants.
#[derive(Debug, Clone, Copy, Default)]
pub struct BillingEngine {
    calendar: CalendarConfig,
}

impl BillingEngine {
    pub fn new(calendar: CalendarConfig) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &CalendarConfig {
        &self.calendar
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.calendar.day_of(now)
    }

    pub fn next_occurrence(
        &self,
        subscription: &Subscription,
        now: DateTime<Utc>,
    ) -> Option<NaiveDate> {
        next_occurrence(subscription, self.today(now))
    }

    pub fn previous_occurrence(
        &self,
        subscription: &Subscription,
        now: DateTime<Utc>,
    ) -> Option<NaiveDate> {
        previous_occurrence(subscription, self.today(now))
    }

    pub fn is_due_in_month(
        &self,
        subscription: &Subscription,
        now: DateTime<Utc>,
        full_month: bool,
    ) -> bool {
        is_due_in_month(subscription, self.today(now), full_month)
    }

    pub fn monthly_cost_remaining<'a, I>(
        &self,
        subscriptions: I,
        now: DateTime<Utc>,
        full_month: bool,
    ) -> Decimal
    where
        I: IntoIterator<Item = &'a Subscription>,
    {
        monthly_cost_remaining(subscriptions, self.today(now), full_month)
    }
}
