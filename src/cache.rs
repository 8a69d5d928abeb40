//! Optional memoization for planner results.
//!
//! The planner is a pure function, so caching is purely additive: a stale
//! or missing entry only costs a recomputation, never a divergent result.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde_json::json;

use crate::debt::{DebtItem, Strategy};
use crate::error::Result;
use crate::planner::{PaymentPlan, generate_payment_plan};

struct CacheEntry {
    plan: PaymentPlan,
    inserted_at: Instant,
}

/// A time-expiring cache keyed by the full planner input, wrapped around
/// [`generate_payment_plan`].
///
/// A zero `max_age` disables expiry.
pub struct PlanCache {
    max_age: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl PlanCache {
    pub fn new(max_age: Duration) -> Self {
        PlanCache {
            max_age,
            entries: HashMap::new(),
        }
    }

    /// A deterministic key covering every input the plan depends on.
    pub fn cache_key(debts: &[DebtItem], monthly_budget: Decimal, strategy: Strategy) -> String {
        json!({
            "debts": debts,
            "budget": monthly_budget,
            "strategy": strategy,
        })
        .to_string()
    }

    /// Returns the plan for these inputs, computing and storing it on a
    /// miss or after expiry. Errors are never cached.
    pub fn get_or_compute(
        &mut self,
        debts: &[DebtItem],
        monthly_budget: Decimal,
        strategy: Strategy,
    ) -> Result<PaymentPlan> {
        let key = Self::cache_key(debts, monthly_budget, strategy);
        if let Some(plan) = self.get(&key) {
            return Ok(plan);
        }
        let plan = generate_payment_plan(debts, monthly_budget, strategy)?;
        self.entries.insert(
            key,
            CacheEntry {
                plan: plan.clone(),
                inserted_at: Instant::now(),
            },
        );
        Ok(plan)
    }

    fn get(&mut self, key: &str) -> Option<PaymentPlan> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                !self.max_age.is_zero() && entry.inserted_at.elapsed() > self.max_age
            }
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.plan.clone())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::DebtKind;
    use rust_decimal_macros::dec;

    fn debts() -> Vec<DebtItem> {
        vec![DebtItem {
            id: "d1".to_string(),
            name: "Loan".to_string(),
            kind: DebtKind::Loan,
            balance: dec!(1000),
            annual_rate: dec!(5),
            min_payment: dec!(100),
            remaining_term: None,
            is_active: true,
        }]
    }

    #[test]
    fn test_hit_returns_same_plan_without_growth() {
        let mut cache = PlanCache::new(Duration::from_secs(300));
        let first = cache
            .get_or_compute(&debts(), dec!(200), Strategy::Avalanche)
            .unwrap();
        let second = cache
            .get_or_compute(&debts(), dec!(200), Strategy::Avalanche)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_distinguishes_strategy_and_budget() {
        let mut cache = PlanCache::new(Duration::from_secs(300));
        cache
            .get_or_compute(&debts(), dec!(200), Strategy::Avalanche)
            .unwrap();
        cache
            .get_or_compute(&debts(), dec!(200), Strategy::Snowball)
            .unwrap();
        cache
            .get_or_compute(&debts(), dec!(250), Strategy::Snowball)
            .unwrap();
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_entries_expire_after_max_age() {
        let mut cache = PlanCache::new(Duration::from_nanos(1));
        cache
            .get_or_compute(&debts(), dec!(200), Strategy::Avalanche)
            .unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let key = PlanCache::cache_key(&debts(), dec!(200), Strategy::Avalanche);
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = PlanCache::new(Duration::from_secs(300));
        // Budget below the 100 minimum.
        let result = cache.get_or_compute(&debts(), dec!(50), Strategy::Avalanche);
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cache = PlanCache::new(Duration::from_secs(300));
        cache
            .get_or_compute(&debts(), dec!(200), Strategy::Avalanche)
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
