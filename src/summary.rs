//! Portfolio-level aggregation and the explicit never-pays-off sentinel.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::credit_card::{CreditCard, PayoffProjection, calculate_credit_card};
use crate::error::Result;
use crate::loan::{Loan, calculate_loan};

/// A lifetime interest total that is either a finite amount or the explicit
/// never-pays-off sentinel.
///
/// Summation absorbs into `NeverPaysOff`: if any constituent debt never
/// pays off, so does the portfolio. This replaces reliance on IEEE-754
/// infinity propagating through float sums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InterestTotal {
    Finite(Decimal),
    NeverPaysOff,
}

impl InterestTotal {
    pub const ZERO: InterestTotal = InterestTotal::Finite(dec!(0));

    pub fn is_never_pays_off(&self) -> bool {
        matches!(self, InterestTotal::NeverPaysOff)
    }

    pub fn as_finite(&self) -> Option<Decimal> {
        match self {
            InterestTotal::Finite(amount) => Some(*amount),
            InterestTotal::NeverPaysOff => None,
        }
    }
}

impl Add for InterestTotal {
    type Output = InterestTotal;

    fn add(self, other: InterestTotal) -> InterestTotal {
        match (self, other) {
            (InterestTotal::Finite(a), InterestTotal::Finite(b)) => InterestTotal::Finite(a + b),
            _ => InterestTotal::NeverPaysOff,
        }
    }
}

impl AddAssign for InterestTotal {
    fn add_assign(&mut self, other: InterestTotal) {
        *self = *self + other;
    }
}

impl Sum for InterestTotal {
    fn sum<I: Iterator<Item = InterestTotal>>(iter: I) -> InterestTotal {
        iter.fold(InterestTotal::ZERO, Add::add)
    }
}

impl From<PayoffProjection> for InterestTotal {
    fn from(projection: PayoffProjection) -> InterestTotal {
        match projection {
            PayoffProjection::PaidOff { total_interest, .. } => {
                InterestTotal::Finite(total_interest)
            }
            PayoffProjection::NeverPaysOff => InterestTotal::NeverPaysOff,
        }
    }
}

/// Portfolio-level totals across active loans and cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_balance: Decimal,
    /// Sum of loan payments (with fees) and card effective minimums.
    pub total_monthly_payment: Decimal,
    pub total_monthly_interest: Decimal,
    /// Lifetime interest across all debts; loans amortize to a finite
    /// figure, cards contribute their minimum-only projection.
    pub total_lifetime_interest: InterestTotal,
    /// Balance plus lifetime interest.
    pub total_payable: InterestTotal,
}

/// Folds active loans and cards into portfolio totals.
///
/// # Errors
///
/// Propagates validation failures from the per-debt calculators.
pub fn summarize_portfolio(loans: &[Loan], cards: &[CreditCard]) -> Result<PortfolioSummary> {
    let mut total_balance = dec!(0);
    let mut total_monthly_payment = dec!(0);
    let mut total_monthly_interest = dec!(0);
    let mut total_lifetime_interest = InterestTotal::ZERO;

    for loan in loans.iter().filter(|l| l.is_active) {
        let schedule = calculate_loan(loan)?;
        total_balance += loan.principal;
        total_monthly_payment += schedule.monthly_payment + loan.monthly_fee;
        total_monthly_interest += schedule.first_month_interest;
        total_lifetime_interest += InterestTotal::Finite(schedule.total_interest);
    }

    for card in cards.iter().filter(|c| c.is_active) {
        let summary = calculate_credit_card(card)?;
        total_balance += card.balance;
        total_monthly_payment += summary.effective_payment;
        total_monthly_interest += summary.monthly_interest;
        total_lifetime_interest += InterestTotal::from(summary.payoff);
    }

    Ok(PortfolioSummary {
        total_balance,
        total_monthly_payment,
        total_monthly_interest,
        total_lifetime_interest,
        total_payable: InterestTotal::Finite(total_balance) + total_lifetime_interest,
    })
}

/// The calendar date `months` whole months after `start`.
pub fn debt_free_date(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months))
}
