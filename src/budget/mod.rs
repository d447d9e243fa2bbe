//! Monthly budget evaluation over the full-month bill.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    billing::{current_subscriptions, is_due_in_month, monthly_cost_remaining, Subscription},
    config::Config,
    entitlement::Entitlement,
};

/// Comparison of this month's bill against the configured budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetStatus {
    /// No budget configured, switched off, or not unlocked.
    Disabled,
    Within {
        cost: Decimal,
        budget: Decimal,
        remaining: Decimal,
    },
    Exceeded {
        cost: Decimal,
        budget: Decimal,
        overage: Decimal,
    },
    /// Over budget, but the user dismissed the warning for this month.
    Ignored { cost: Decimal, budget: Decimal },
}

impl BudgetStatus {
    pub fn should_warn(&self) -> bool {
        matches!(self, BudgetStatus::Exceeded { .. })
    }
}

pub struct BudgetService;

impl BudgetService {
    /// Evaluates the month containing `reference` for the current subscriptions.
    pub fn evaluate(
        subscriptions: &[Subscription],
        reference: NaiveDate,
        config: &Config,
    ) -> BudgetStatus {
        let unlocked = Entitlement::from_config(config).allows_budget();
        let budget = match config.monthly_budget {
            Some(budget) if config.budget_active && unlocked => budget,
            _ => return BudgetStatus::Disabled,
        };
        let current = current_subscriptions(subscriptions, reference);
        let cost = monthly_cost_remaining(current, reference, true);
        if cost <= budget {
            return BudgetStatus::Within {
                cost,
                budget,
                remaining: budget - cost,
            };
        }
        if config.is_budget_ignored(reference) {
            tracing::debug!(%reference, "budget overage dismissed for month");
            return BudgetStatus::Ignored { cost, budget };
        }
        BudgetStatus::Exceeded {
            cost,
            budget,
            overage: cost - budget,
        }
    }

    /// Current subscriptions billing at any point in the month of `reference`.
    pub fn due_this_month(
        subscriptions: &[Subscription],
        reference: NaiveDate,
    ) -> Vec<&Subscription> {
        current_subscriptions(subscriptions, reference)
            .filter(|sub| is_due_in_month(sub, reference, true))
            .collect()
    }
}
