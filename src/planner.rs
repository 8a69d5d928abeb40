//! Month-by-month repayment simulation across a heterogeneous debt set.

use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::PAYOFF_HORIZON_MONTHS;
use crate::credit_card::PayoffProjection;
use crate::debt::{DebtItem, DebtKind, Strategy, prioritize};
use crate::error::{Error, Result, ensure_non_negative};
use crate::loan::monthly_periodic_rate;
use crate::summary::InterestTotal;

/// One debt's share of a simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: String,
    pub payment: Decimal,
    /// Interest accrued this month: previous balance times the periodic rate.
    pub interest: Decimal,
    pub principal: Decimal,
    pub remaining_balance: Decimal,
}

/// One simulated month across the whole debt set. Months are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEntry {
    pub month: u32,
    pub payments: Vec<DebtPayment>,
    pub total_paid: Decimal,
    pub total_interest: Decimal,
    pub total_principal: Decimal,
    pub total_remaining: Decimal,
    pub cumulative_interest: Decimal,
    pub cumulative_principal: Decimal,
    /// Ids of debts that reached zero this month.
    pub paid_off: Vec<String>,
}

/// The full output of the strategy planner. Computed fresh per invocation
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub strategy: Strategy,
    pub monthly_budget: Decimal,
    pub entries: Vec<MonthEntry>,
    pub months: u32,
    pub total_paid: Decimal,
    pub total_interest: InterestTotal,
    /// Month index at which each debt reached zero.
    pub payoff_month: HashMap<String, u32>,
    /// Month index from which no credit card carries a balance, when the
    /// set contains cards and they all pay off.
    pub credit_card_free_month: Option<u32>,
    pub outcome: PayoffProjection,
}

fn empty_plan(strategy: Strategy, monthly_budget: Decimal) -> PaymentPlan {
    PaymentPlan {
        strategy,
        monthly_budget,
        entries: Vec::new(),
        months: 0,
        total_paid: dec!(0),
        total_interest: InterestTotal::ZERO,
        payoff_month: HashMap::new(),
        credit_card_free_month: None,
        outcome: PayoffProjection::PaidOff {
            months: 0,
            total_interest: dec!(0),
        },
    }
}

/// Simulates repayment of `debts` under a fixed monthly budget until every
/// balance reaches zero or the payoff horizon is hit.
///
/// Each month, in order: interest accrues on every active debt, every debt
/// receives its minimum payment (clamped to balance plus interest), and the
/// leftover budget goes to the debt the strategy selects, cascading down
/// the priority order when that debt clears mid-month. `Equal` splits the
/// leftover in proportion to balance share instead. Minimums freed by paid
/// debts roll into the leftover of later months automatically.
///
/// The simulation always terminates: it stops as soon as some debt's
/// accrued interest reaches the whole budget (no payment can ever amortize
/// it then), and in any case after [`PAYOFF_HORIZON_MONTHS`]. Either way
/// the plan is returned with a `NeverPaysOff` outcome.
///
/// # Errors
///
/// * [`Error::Validation`] for malformed debt records or a negative budget.
/// * [`Error::InsufficientBudget`] when the budget does not cover the sum
///   of required minimum payments.
pub fn generate_payment_plan(
    debts: &[DebtItem],
    monthly_budget: Decimal,
    strategy: Strategy,
) -> Result<PaymentPlan> {
    for debt in debts {
        debt.validate()?;
    }
    ensure_non_negative("monthly_budget", monthly_budget)?;

    let mut working: Vec<DebtItem> = debts
        .iter()
        .filter(|d| d.is_active && d.balance > dec!(0))
        .cloned()
        .collect();
    if working.is_empty() {
        return Ok(empty_plan(strategy, monthly_budget));
    }

    let required: Decimal = working
        .iter()
        .map(|d| {
            let interest = d.balance * monthly_periodic_rate(d.annual_rate);
            d.min_payment.min(d.balance + interest)
        })
        .sum();
    if monthly_budget < required {
        return Err(Error::InsufficientBudget {
            required,
            available: monthly_budget,
        });
    }

    let mut entries: Vec<MonthEntry> = Vec::new();
    let mut payoff_month: HashMap<String, u32> = HashMap::new();
    let mut cumulative_interest = dec!(0);
    let mut cumulative_principal = dec!(0);
    let mut total_paid = dec!(0);

    for month in 0..PAYOFF_HORIZON_MONTHS {
        // 1. Accrue interest and set minimum payments.
        let mut interests = vec![dec!(0); working.len()];
        let mut payments = vec![dec!(0); working.len()];
        let mut spent = dec!(0);
        for (idx, debt) in working.iter().enumerate() {
            if !debt.is_active {
                continue;
            }
            let interest = debt.balance * monthly_periodic_rate(debt.annual_rate);
            let payment = debt.min_payment.min(debt.balance + interest);
            interests[idx] = interest;
            payments[idx] = payment;
            spent += payment;
        }

        // A debt whose accrued interest already consumes the whole budget
        // can never amortize: its payment is capped by the budget while its
        // interest never shrinks. Stop here instead of compounding the
        // balance further, which would eventually overflow `Decimal`.
        let hopeless = working
            .iter()
            .enumerate()
            .any(|(idx, d)| d.is_active && interests[idx] >= monthly_budget);
        if hopeless {
            break;
        }

        // 2. Direct the leftover according to the strategy.
        let leftover = (monthly_budget - spent).max(dec!(0));
        let order = prioritize(&working, strategy);
        let capacity = |idx: usize, payments: &[Decimal]| {
            (working[idx].balance + interests[idx] - payments[idx]).max(dec!(0))
        };
        match strategy {
            Strategy::Avalanche | Strategy::Snowball => {
                let mut remaining = leftover;
                for &idx in &order {
                    if remaining <= dec!(0) {
                        break;
                    }
                    let extra = remaining.min(capacity(idx, &payments));
                    payments[idx] += extra;
                    remaining -= extra;
                }
            }
            Strategy::Equal => {
                let total_balance: Decimal = order.iter().map(|&i| working[i].balance).sum();
                if leftover > dec!(0) && total_balance > dec!(0) {
                    let mut granted = dec!(0);
                    for &idx in &order {
                        let share = leftover * working[idx].balance / total_balance;
                        let extra = share.min(capacity(idx, &payments));
                        payments[idx] += extra;
                        granted += extra;
                    }
                    // Clamping leaves residue; re-grant it in input order.
                    let mut residue = leftover - granted;
                    for &idx in &order {
                        if residue <= dec!(0) {
                            break;
                        }
                        let extra = residue.min(capacity(idx, &payments));
                        payments[idx] += extra;
                        residue -= extra;
                    }
                }
            }
        }

        // 3. Apply payments and record the month.
        let mut month_payments = Vec::new();
        let mut paid_off = Vec::new();
        let mut month_paid = dec!(0);
        let mut month_interest = dec!(0);
        let mut month_principal = dec!(0);
        let mut total_remaining = dec!(0);
        for (idx, debt) in working.iter_mut().enumerate() {
            if !debt.is_active {
                continue;
            }
            let interest = interests[idx];
            let payment = payments[idx];
            // Payments never exceed balance + interest, so this bottoms out
            // at exactly zero.
            let new_balance = (debt.balance + interest - payment).max(dec!(0));
            let principal = if payment > interest {
                payment - interest
            } else {
                dec!(0)
            };

            month_paid += payment;
            month_interest += interest;
            month_principal += principal;
            total_remaining += new_balance;
            debt.balance = new_balance;
            if new_balance.is_zero() {
                debt.is_active = false;
                payoff_month.insert(debt.id.clone(), month);
                paid_off.push(debt.id.clone());
            }
            month_payments.push(DebtPayment {
                id: debt.id.clone(),
                payment,
                interest,
                principal,
                remaining_balance: new_balance,
            });
        }

        cumulative_interest += month_interest;
        cumulative_principal += month_principal;
        total_paid += month_paid;
        entries.push(MonthEntry {
            month,
            payments: month_payments,
            total_paid: month_paid,
            total_interest: month_interest,
            total_principal: month_principal,
            total_remaining,
            cumulative_interest,
            cumulative_principal,
            paid_off,
        });

        if working.iter().all(|d| !d.is_active) {
            break;
        }
    }

    let unfinished = working.iter().any(|d| d.is_active);
    let months = entries.len() as u32;
    let (outcome, total_interest) = if unfinished {
        warn!(
            "{:?} plan cannot pay off: debt still remaining after {} simulated months",
            strategy,
            entries.len()
        );
        (PayoffProjection::NeverPaysOff, InterestTotal::NeverPaysOff)
    } else {
        (
            PayoffProjection::PaidOff {
                months,
                total_interest: cumulative_interest,
            },
            InterestTotal::Finite(cumulative_interest),
        )
    };

    let card_ids: Vec<&String> = working
        .iter()
        .filter(|d| d.kind == DebtKind::CreditCard)
        .map(|d| &d.id)
        .collect();
    let credit_card_free_month = if card_ids.is_empty() {
        None
    } else {
        card_ids
            .iter()
            .map(|id| payoff_month.get(*id).copied())
            .collect::<Option<Vec<u32>>>()
            .and_then(|months| months.into_iter().max())
    };

    debug!(
        "generated {:?} plan: {} months, outcome {:?}",
        strategy, months, outcome
    );
    Ok(PaymentPlan {
        strategy,
        monthly_budget,
        entries,
        months,
        total_paid,
        total_interest,
        payoff_month,
        credit_card_free_month,
        outcome,
    })
}
