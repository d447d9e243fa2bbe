//! Free-tier limits and premium unlock checks.

use chrono::NaiveDate;

use crate::{
    billing::{current_subscriptions, Subscription},
    config::Config,
    errors::SubscriptionError,
};

/// Number of active subscriptions the free tier may hold.
pub const FREE_TIER_LIMIT: usize = 5;

/// Purchase state the caller resolved from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Entitlement {
    pub premium: bool,
}

impl Entitlement {
    pub fn free() -> Self {
        Self { premium: false }
    }

    pub fn premium() -> Self {
        Self { premium: true }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            premium: config.premium_unlocked,
        }
    }

    /// Maximum number of active subscriptions, `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        (!self.premium).then_some(FREE_TIER_LIMIT)
    }

    pub fn can_add(&self, active_count: usize) -> bool {
        self.limit().map_or(true, |limit| active_count < limit)
    }

    pub fn ensure_can_add(&self, active_count: usize) -> Result<(), SubscriptionError> {
        match self.limit() {
            Some(limit) if active_count >= limit => {
                tracing::info!(active_count, limit, "free tier limit reached");
                Err(SubscriptionError::LimitReached { limit })
            }
            _ => Ok(()),
        }
    }

    /// Same check, counting the subscriptions that are current on `today`.
    pub fn ensure_can_add_to(
        &self,
        subscriptions: &[Subscription],
        today: NaiveDate,
    ) -> Result<(), SubscriptionError> {
        self.ensure_can_add(current_subscriptions(subscriptions, today).count())
    }

    /// Monthly budget tracking is a premium feature.
    pub fn allows_budget(&self) -> bool {
        self.premium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::BillingCycle;

    #[test]
    fn free_tier_stops_at_limit() {
        let free = Entitlement::free();
        assert!(free.can_add(FREE_TIER_LIMIT - 1));
        assert!(!free.can_add(FREE_TIER_LIMIT));
        assert!(free.ensure_can_add(4).is_ok());
        assert!(matches!(
            free.ensure_can_add(5),
            Err(SubscriptionError::LimitReached { limit: 5 })
        ));
    }

    #[test]
    fn premium_is_unlimited() {
        let premium = Entitlement::premium();
        assert_eq!(premium.limit(), None);
        assert!(premium.can_add(1_000));
        assert!(premium.allows_budget());
    }

    #[test]
    fn inactive_subscriptions_do_not_count() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let mut subs: Vec<_> = (0..5)
            .map(|i| Subscription::new(format!("Item {i}"), BillingCycle::Monthly))
            .collect();
        assert!(Entitlement::free().ensure_can_add_to(&subs, today).is_err());
        subs[0].deactivate(today);
        assert!(Entitlement::free().ensure_can_add_to(&subs, today).is_ok());
    }
}
