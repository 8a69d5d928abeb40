//! Revolving-balance credit card calculations.

use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::PAYOFF_HORIZON_MONTHS;
use crate::error::{Result, ValidationError, ensure_non_negative, ensure_plausible_rate};
use crate::loan::monthly_periodic_rate;

/// Balances below one cent count as settled, so percentage-only minimum
/// rules cannot drag the trajectory out with sub-cent residue.
const SETTLED_THRESHOLD: Decimal = dec!(0.01);

/// A revolving-balance debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    pub balance: Decimal,
    /// Annual interest rate as a percentage.
    pub apr: Decimal,
    /// Flat minimum payment; acts as the floor under the percentage rule.
    pub min_payment: Decimal,
    /// Minimum payment as a percentage of the current balance.
    pub min_payment_percent: Decimal,
    pub credit_limit: Decimal,
    /// The holder clears the full balance every month.
    #[serde(default)]
    pub pays_in_full: bool,
    pub is_active: bool,
}

/// Outcome of a minimum-only payoff trajectory.
///
/// `NeverPaysOff` is an explicit sentinel: the minimum payment fails to
/// exceed accrued interest at some point, or repayment outlasts the payoff
/// horizon. Callers must branch on it rather than expect an infinity to
/// flow through sums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PayoffProjection {
    PaidOff { months: u32, total_interest: Decimal },
    NeverPaysOff,
}

impl PayoffProjection {
    pub fn is_never_pays_off(&self) -> bool {
        matches!(self, PayoffProjection::NeverPaysOff)
    }

    pub fn months(&self) -> Option<u32> {
        match self {
            PayoffProjection::PaidOff { months, .. } => Some(*months),
            PayoffProjection::NeverPaysOff => None,
        }
    }
}

/// Per-card figures for the current month plus the minimum-only projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub monthly_interest: Decimal,
    /// The payment the minimum rule requires this month, clamped so it never
    /// exceeds balance plus accrued interest.
    pub effective_payment: Decimal,
    /// Balance over credit limit; zero when no limit is set.
    pub utilization: Decimal,
    pub payoff: PayoffProjection,
}

/// Aggregate figures across a set of active cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPortfolioTotals {
    pub total_balance: Decimal,
    pub total_limit: Decimal,
    pub total_utilization: Decimal,
    pub total_min_payment: Decimal,
    pub total_monthly_interest: Decimal,
}

impl CreditCard {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("balance", self.balance)?;
        ensure_non_negative("min_payment", self.min_payment)?;
        ensure_non_negative("min_payment_percent", self.min_payment_percent)?;
        ensure_non_negative("credit_limit", self.credit_limit)?;
        ensure_plausible_rate(self.apr)?;
        let has_minimum_rule = self.min_payment > dec!(0) || self.min_payment_percent > dec!(0);
        if self.balance > dec!(0) && !self.pays_in_full && !has_minimum_rule {
            return Err(ValidationError::MissingMinimumPayment(self.name.clone()).into());
        }
        Ok(())
    }
}

/// Interest accrued on `balance` over one month at the nominal monthly rate.
pub fn monthly_interest(balance: Decimal, apr: Decimal) -> Decimal {
    balance * monthly_periodic_rate(apr)
}

/// The minimum payment the card rules require at a given balance: the
/// greater of the flat amount and the percentage of balance.
pub fn effective_min_payment(balance: Decimal, flat: Decimal, percent: Decimal) -> Decimal {
    let percent_payment = balance * percent / dec!(100);
    flat.max(percent_payment)
}

/// Simulates paying only the minimum, month by month, until the balance
/// settles or the payoff horizon is hit.
pub fn minimum_only_projection(card: &CreditCard) -> PayoffProjection {
    if card.balance < SETTLED_THRESHOLD {
        return PayoffProjection::PaidOff {
            months: 0,
            total_interest: dec!(0),
        };
    }
    if card.pays_in_full {
        return PayoffProjection::PaidOff {
            months: 1,
            total_interest: monthly_interest(card.balance, card.apr),
        };
    }

    let rate = monthly_periodic_rate(card.apr);
    let mut balance = card.balance;
    let mut total_interest = dec!(0);
    let mut months = 0u32;

    while balance >= SETTLED_THRESHOLD && months < PAYOFF_HORIZON_MONTHS {
        let interest = balance * rate;
        let required = effective_min_payment(balance, card.min_payment, card.min_payment_percent);
        if required <= interest {
            return PayoffProjection::NeverPaysOff;
        }
        let payment = required.min(balance + interest);
        balance = balance + interest - payment;
        total_interest += interest;
        months += 1;
    }

    if balance >= SETTLED_THRESHOLD {
        warn!(
            "card '{}' not settled within {} months, treating as never paying off",
            card.name, PAYOFF_HORIZON_MONTHS
        );
        return PayoffProjection::NeverPaysOff;
    }
    PayoffProjection::PaidOff {
        months,
        total_interest,
    }
}

/// Calculates the current-month figures and minimum-only projection for a
/// single card.
///
/// # Errors
///
/// Returns a validation error for negative amounts, a negative or
/// implausibly high rate, or a carried balance with no minimum payment
/// rule at all.
pub fn calculate_credit_card(card: &CreditCard) -> Result<CardSummary> {
    card.validate()?;

    let interest = monthly_interest(card.balance, card.apr);
    let effective_payment = if card.pays_in_full {
        card.balance + interest
    } else {
        effective_min_payment(card.balance, card.min_payment, card.min_payment_percent)
            .min(card.balance + interest)
    };
    let utilization = if card.credit_limit > dec!(0) {
        card.balance / card.credit_limit
    } else {
        dec!(0)
    };

    Ok(CardSummary {
        monthly_interest: interest,
        effective_payment,
        utilization,
        payoff: minimum_only_projection(card),
    })
}

/// Sums balances, limits and required payments across active cards.
pub fn card_portfolio_totals(cards: &[CreditCard]) -> Result<CardPortfolioTotals> {
    let mut totals = CardPortfolioTotals {
        total_balance: dec!(0),
        total_limit: dec!(0),
        total_utilization: dec!(0),
        total_min_payment: dec!(0),
        total_monthly_interest: dec!(0),
    };

    for card in cards.iter().filter(|c| c.is_active) {
        let summary = calculate_credit_card(card)?;
        totals.total_balance += card.balance;
        totals.total_limit += card.credit_limit;
        totals.total_min_payment += summary.effective_payment;
        totals.total_monthly_interest += summary.monthly_interest;
    }
    if totals.total_limit > dec!(0) {
        totals.total_utilization = totals.total_balance / totals.total_limit;
    }
    Ok(totals)
}
