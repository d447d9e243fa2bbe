use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::{
    billing::{
        current_subscriptions, days_until_next, previous_bill_since_anchor, upcoming,
        BillingEngine, Clock, Subscription, SystemClock,
    },
    budget::{BudgetService, BudgetStatus},
    config::{Config, ConfigManager},
    currency::{format_currency_value, CurrencyCode, LocaleConfig},
    entitlement::Entitlement,
    reminders::{ReminderOptions, ReminderPlanner},
    utils::{build_info, paths, persistence},
};

use super::{output, CliArgs, CliError};

/// Loaded state shared by the data-driven commands.
pub struct CliContext {
    pub config: Config,
    pub engine: BillingEngine,
    pub subscriptions: Vec<Subscription>,
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    currency: CurrencyCode,
    locale: LocaleConfig,
}

impl CliContext {
    pub fn load(args: &CliArgs) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        let path = args.file.clone().unwrap_or_else(paths::subscriptions_file);
        let subscriptions = load_subscriptions(path)?;
        // `--date` pins the clock to midday so the day never shifts across offsets.
        let now = match args.date {
            Some(date) => {
                let midday = date.and_time(NaiveTime::default()) + Duration::hours(12);
                config.calendar.to_utc(midday)
            }
            None => SystemClock.now(),
        };
        Ok(Self::new(config, subscriptions, now))
    }

    pub fn new(config: Config, subscriptions: Vec<Subscription>, now: DateTime<Utc>) -> Self {
        let engine = BillingEngine::new(config.calendar);
        let today = engine.today(now);
        let currency = CurrencyCode::new(config.currency.as_str());
        let locale = LocaleConfig::for_tag(&config.locale);
        Self {
            config,
            engine,
            subscriptions,
            now,
            today,
            currency,
            locale,
        }
    }

    fn money(&self, amount: Decimal) -> String {
        format_currency_value(amount, &self.currency, &self.locale)
    }
}

fn load_subscriptions(path: PathBuf) -> Result<Vec<Subscription>, CliError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no subscription file, starting empty");
        return Ok(Vec::new());
    }
    Ok(persistence::load_subscriptions_from_file(&path)?)
}

pub fn list(context: &CliContext) {
    output::section(format!("Subscriptions on {}", context.today));
    let current = current_subscriptions(&context.subscriptions, context.today);
    let scheduled = upcoming(current, context.today);
    if scheduled.is_empty() {
        output::info("No upcoming bills.");
    }
    for (subscription, next) in &scheduled {
        let cost = subscription
            .cost
            .map(|cost| context.money(cost))
            .unwrap_or_default();
        let days = days_until_next(subscription, context.today).unwrap_or_default();
        let previous = previous_bill_since_anchor(subscription, context.today)
            .map(|date| date.to_string())
            .unwrap_or_else(|| "none".into());
        output::row(format!(
            "{} | {} {} | next {} (in {} days) | previous {}",
            subscription.title, cost, subscription.cycle, next, days, previous
        ));
    }
    let idle: Vec<_> = context
        .subscriptions
        .iter()
        .filter(|sub| !scheduled.iter().any(|(listed, _)| listed.id == sub.id))
        .collect();
    if !idle.is_empty() {
        output::section("Not billing");
        for subscription in idle {
            output::row(&subscription.title);
        }
    }
}

pub fn month(context: &CliContext, full_month: bool) {
    let current = current_subscriptions(&context.subscriptions, context.today);
    let total = context
        .engine
        .monthly_cost_remaining(current, context.now, full_month);
    if full_month {
        output::info(format!("Total this month: {}", context.money(total)));
    } else {
        output::info(format!("Remaining this month: {}", context.money(total)));
    }
}

pub fn budget(context: &CliContext) {
    match BudgetService::evaluate(&context.subscriptions, context.today, &context.config) {
        BudgetStatus::Disabled => output::info("Budget tracking is off."),
        BudgetStatus::Within {
            cost,
            budget,
            remaining,
        } => output::success(format!(
            "This month's bill of {} is within your budget of {} ({} left).",
            context.money(cost),
            context.money(budget),
            context.money(remaining)
        )),
        BudgetStatus::Exceeded {
            cost,
            budget,
            overage,
        } => output::warning(format!(
            "This month's bill of {} exceeds your budget of {} by {}.",
            context.money(cost),
            context.money(budget),
            context.money(overage)
        )),
        BudgetStatus::Ignored { cost, budget } => output::info(format!(
            "This month's bill of {} is over your budget of {}; warning dismissed.",
            context.money(cost),
            context.money(budget)
        )),
    }
}

pub fn reminders(context: &CliContext) {
    let planner = ReminderPlanner::new(ReminderOptions::from_config(&context.config));
    let planned = planner.plan(&context.subscriptions, context.now);
    if planned.is_empty() {
        output::info("No reminders scheduled.");
        return;
    }
    output::section("Reminders");
    for note in planned {
        output::row(format!("{}  {}", note.fire_at.format("%Y-%m-%d %H:%M"), note.body));
    }
}

pub fn add_check(context: &CliContext) -> Result<(), CliError> {
    let entitlement = Entitlement::from_config(&context.config);
    entitlement.ensure_can_add_to(&context.subscriptions, context.today)?;
    let active = current_subscriptions(&context.subscriptions, context.today).count();
    match entitlement.limit() {
        Some(limit) => output::success(format!(
            "You can add another subscription ({active} of {limit} used)."
        )),
        None => output::success(format!(
            "You can add another subscription ({active} active, no limit)."
        )),
    }
    Ok(())
}

pub fn version() {
    println!("{}", build_info::current().summary());
}
