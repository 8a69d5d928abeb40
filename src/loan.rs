//! Fixed-term installment loan calculations.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::PAYOFF_HORIZON_MONTHS;
use crate::error::{
    Error, Result, ValidationError, ensure_non_negative, ensure_plausible_rate,
    ensure_term_within_horizon,
};

/// Repayment style of a fixed-term loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanKind {
    /// Constant total payment, varying interest/principal split.
    Annuity,
    /// Constant principal portion, declining total payment.
    EqualPrincipal,
    /// Total interest computed up front and spread evenly across the term.
    FixedInstallment,
}

/// A fixed-term installment debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub name: String,
    /// Outstanding principal amount.
    pub principal: Decimal,
    /// Annual nominal interest rate as a percentage (e.g. 5.5 for 5.5%).
    pub annual_rate: Decimal,
    /// An explicit margin added to `annual_rate`, e.g. for a variable-rate
    /// loan quoted as reference rate plus margin. Defaults to zero and is
    /// applied exactly once, in [`Loan::effective_rate`].
    #[serde(default)]
    pub rate_adjustment: Decimal,
    pub term_months: u32,
    /// Flat servicing fee charged on top of every payment.
    #[serde(default)]
    pub monthly_fee: Decimal,
    pub kind: LoanKind,
    pub is_active: bool,
}

/// One month's interest/principal split within an amortization curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSplit {
    pub principal: Decimal,
    pub interest: Decimal,
    /// Remaining balance after this month's payment.
    pub balance: Decimal,
}

/// The computed repayment profile of a single loan.
///
/// Amounts are returned unrounded; callers round for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSchedule {
    /// The first month's total payment. Constant over the whole term for
    /// annuity and fixed-installment loans.
    pub monthly_payment: Decimal,
    pub first_month_interest: Decimal,
    pub first_month_principal: Decimal,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub curve: Vec<MonthSplit>,
}

impl LoanSchedule {
    fn zero() -> Self {
        LoanSchedule {
            monthly_payment: Decimal::ZERO,
            first_month_interest: Decimal::ZERO,
            first_month_principal: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            curve: Vec::new(),
        }
    }
}

impl Loan {
    /// The rate actually used in payment formulas: the quoted annual rate
    /// plus the explicit adjustment margin.
    pub fn effective_rate(&self) -> Decimal {
        self.annual_rate + self.rate_adjustment
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("principal", self.principal)?;
        ensure_non_negative("monthly_fee", self.monthly_fee)?;
        ensure_plausible_rate(self.annual_rate)?;
        ensure_plausible_rate(self.effective_rate())?;
        if self.term_months == 0 && !self.principal.is_zero() {
            return Err(ValidationError::ZeroTerm.into());
        }
        ensure_term_within_horizon(self.term_months)?;
        Ok(())
    }
}

/// Converts an annual percentage rate to the nominal monthly rate used for
/// monthly compounding: `annual / 12 / 100`.
pub fn monthly_periodic_rate(annual_pct: Decimal) -> Decimal {
    annual_pct / dec!(12) / dec!(100)
}

/// Calculates the repayment schedule for a single loan.
///
/// A zero-principal loan yields the all-zero schedule. A zero rate
/// degenerates to straight division of the principal over the term.
///
/// # Errors
///
/// Returns a validation error for negative amounts, a zero term, a rate
/// above [`MAX_ANNUAL_RATE_PCT`](crate::MAX_ANNUAL_RATE_PCT) or a term
/// beyond the payoff horizon.
pub fn calculate_loan(loan: &Loan) -> Result<LoanSchedule> {
    loan.validate()?;
    if loan.principal.is_zero() {
        return Ok(LoanSchedule::zero());
    }

    let rate = monthly_periodic_rate(loan.effective_rate());
    match loan.kind {
        LoanKind::Annuity => Ok(annuity_schedule(loan.principal, rate, loan.term_months)),
        LoanKind::EqualPrincipal => {
            Ok(equal_principal_schedule(loan.principal, rate, loan.term_months))
        }
        LoanKind::FixedInstallment => Ok(fixed_installment_schedule(
            loan.principal,
            loan.effective_rate(),
            loan.term_months,
        )),
    }
}

/// Annuity formula: `PMT = P * [r(1 + r)^n] / [(1 + r)^n - 1]`.
fn annuity_schedule(principal: Decimal, rate: Decimal, months: u32) -> LoanSchedule {
    let monthly_payment = if rate.is_zero() {
        principal / Decimal::from(months)
    } else {
        // pow / (pow - 1) stays close to one, so multiplying it last keeps
        // the intermediates in range even for large principals.
        let pow = (Decimal::ONE + rate).powu(months.into());
        principal * rate * (pow / (pow - Decimal::ONE))
    };

    let mut balance = principal;
    let mut curve = Vec::with_capacity(months as usize);
    for _ in 0..months {
        let interest = balance * rate;
        let amortization = monthly_payment - interest;
        balance -= amortization;
        curve.push(MonthSplit {
            principal: amortization,
            interest,
            balance: balance.max(dec!(0)),
        });
    }

    let total_paid = monthly_payment * Decimal::from(months);
    let first_month_interest = principal * rate;
    LoanSchedule {
        monthly_payment,
        first_month_interest,
        first_month_principal: monthly_payment - first_month_interest,
        total_interest: total_paid - principal,
        total_paid,
        curve,
    }
}

/// Constant-amortization schedule: the principal portion is `P / n` every
/// month while the interest portion declines with the balance.
fn equal_principal_schedule(principal: Decimal, rate: Decimal, months: u32) -> LoanSchedule {
    let fixed_principal = principal / Decimal::from(months);
    let mut balance = principal;
    let mut total_interest = dec!(0);
    let mut curve = Vec::with_capacity(months as usize);
    for _ in 0..months {
        let interest = balance * rate;
        total_interest += interest;
        balance -= fixed_principal;
        curve.push(MonthSplit {
            principal: fixed_principal,
            interest,
            balance: balance.max(dec!(0)),
        });
    }

    let first_month_interest = principal * rate;
    LoanSchedule {
        monthly_payment: fixed_principal + first_month_interest,
        first_month_interest,
        first_month_principal: fixed_principal,
        total_interest,
        total_paid: principal + total_interest,
        curve,
    }
}

/// Flat-interest schedule: lifetime interest is `P * annual_pct * years / 100`
/// regardless of the declining balance, spread evenly across the term.
fn fixed_installment_schedule(principal: Decimal, annual_pct: Decimal, months: u32) -> LoanSchedule {
    let total_interest = principal * annual_pct * Decimal::from(months) / dec!(12) / dec!(100);
    let monthly_payment = (principal + total_interest) / Decimal::from(months);
    let rate = monthly_periodic_rate(annual_pct);

    let mut balance = principal;
    let mut curve = Vec::with_capacity(months as usize);
    for _ in 0..months {
        let interest = balance * rate;
        let amortization = monthly_payment - interest;
        balance -= amortization;
        curve.push(MonthSplit {
            principal: amortization,
            interest,
            balance: balance.max(dec!(0)),
        });
    }

    let first_month_interest = principal * rate;
    LoanSchedule {
        monthly_payment,
        first_month_interest,
        first_month_principal: monthly_payment - first_month_interest,
        total_interest,
        total_paid: principal + total_interest,
        curve,
    }
}

/// Solves the inverse amortization problem: given a principal, a rate and a
/// fixed monthly payment, how many months until the balance reaches zero.
///
/// Uses `n = -ln(1 - r * P / A) / ln(1 + r)`, rounded up to whole months.
/// With a zero rate the term is simply `ceil(P / A)`.
///
/// # Errors
///
/// * [`Error::PaymentTooSmall`] when the payment does not exceed the first
///   month's interest, so the balance never shrinks.
/// * [`Error::HorizonExceeded`] when repayment would outlast the payoff
///   horizon.
pub fn solve_term_for_payment(
    principal: Decimal,
    annual_pct: Decimal,
    payment: Decimal,
) -> Result<u32> {
    ensure_non_negative("principal", principal)?;
    ensure_plausible_rate(annual_pct)?;
    if payment <= dec!(0) {
        return Err(ValidationError::NonPositivePayment(payment).into());
    }
    if principal.is_zero() {
        return Ok(0);
    }

    let rate = monthly_periodic_rate(annual_pct);
    let months = if rate.is_zero() {
        (principal / payment).ceil()
    } else {
        let first_interest = principal * rate;
        if payment <= first_interest {
            return Err(Error::PaymentTooSmall {
                payment,
                interest: first_interest,
            });
        }
        let remainder = Decimal::ONE - rate * principal / payment;
        (-remainder.ln() / (Decimal::ONE + rate).ln()).ceil()
    };

    let months = months.to_u32().unwrap_or(u32::MAX);
    if months > PAYOFF_HORIZON_MONTHS {
        return Err(Error::HorizonExceeded {
            horizon: PAYOFF_HORIZON_MONTHS,
        });
    }
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn annuity_loan(principal: Decimal, rate: Decimal, term_months: u32) -> Loan {
        Loan {
            id: "loan-1".to_string(),
            name: "Test loan".to_string(),
            principal,
            annual_rate: rate,
            rate_adjustment: dec!(0),
            term_months,
            monthly_fee: dec!(0),
            kind: LoanKind::Annuity,
            is_active: true,
        }
    }

    #[test]
    fn test_annuity_standard_case() {
        let loan = annuity_loan(dec!(10000), dec!(5), 60);
        let schedule = calculate_loan(&loan).unwrap();

        assert_eq!(schedule.monthly_payment.round_dp(2), dec!(188.71));
        assert_eq!(schedule.first_month_interest.round_dp(2), dec!(41.67));
        assert_eq!(schedule.total_interest.round_dp(2), dec!(1322.74));
        assert_eq!(schedule.total_paid.round_dp(2), dec!(11322.74));
        assert_eq!(schedule.curve.len(), 60);
        assert_eq!(schedule.curve.last().unwrap().balance.round_dp(2), dec!(0));
    }

    #[test]
    fn test_zero_rate_is_straight_division() {
        let loan = annuity_loan(dec!(9000), dec!(0), 36);
        let schedule = calculate_loan(&loan).unwrap();

        assert_eq!(schedule.monthly_payment, dec!(250));
        assert_eq!(schedule.total_interest, dec!(0));
        assert_eq!(schedule.total_paid, dec!(9000));
    }

    #[test]
    fn test_zero_principal_yields_zero_schedule() {
        let loan = annuity_loan(dec!(0), dec!(5), 60);
        let schedule = calculate_loan(&loan).unwrap();

        assert_eq!(schedule.monthly_payment, dec!(0));
        assert_eq!(schedule.total_paid, dec!(0));
        assert!(schedule.curve.is_empty());
    }

    #[test]
    fn test_rate_adjustment_is_applied_once() {
        let mut adjusted = annuity_loan(dec!(10000), dec!(5), 60);
        adjusted.rate_adjustment = dec!(1);
        let plain = annuity_loan(dec!(10000), dec!(6), 60);

        let a = calculate_loan(&adjusted).unwrap();
        let b = calculate_loan(&plain).unwrap();
        assert_eq!(a.monthly_payment, b.monthly_payment);
        assert_eq!(a.total_interest, b.total_interest);
    }

    #[test]
    fn test_equal_principal_declining_payments() {
        let mut loan = annuity_loan(dec!(12000), dec!(12), 12);
        loan.kind = LoanKind::EqualPrincipal;
        let schedule = calculate_loan(&loan).unwrap();

        // 1000 principal + 120 first-month interest
        assert_eq!(schedule.monthly_payment, dec!(1120));
        assert_eq!(schedule.first_month_principal, dec!(1000));
        // 1% of 78_000 in summed balances
        assert_eq!(schedule.total_interest, dec!(780));
        let last = schedule.curve.last().unwrap();
        assert_eq!(last.balance, dec!(0));
        assert!(last.interest < schedule.first_month_interest);
    }

    #[test]
    fn test_fixed_installment_flat_interest() {
        let mut loan = annuity_loan(dec!(10000), dec!(10), 12);
        loan.kind = LoanKind::FixedInstallment;
        let schedule = calculate_loan(&loan).unwrap();

        assert_eq!(schedule.total_interest, dec!(1000));
        assert_eq!(schedule.monthly_payment.round_dp(2), dec!(916.67));
        assert_eq!(schedule.total_paid, dec!(11000));
    }

    #[rstest]
    #[case(dec!(-1), dec!(5), 12)]
    #[case(dec!(1000), dec!(-2), 12)]
    #[case(dec!(1000), dec!(5), 0)]
    #[case(dec!(1000), dec!(1000), 600)]
    #[case(dec!(1000), dec!(5), 1300)]
    fn test_invalid_inputs_rejected(
        #[case] principal: Decimal,
        #[case] rate: Decimal,
        #[case] term: u32,
    ) {
        let loan = annuity_loan(principal, rate, term);
        assert!(matches!(
            calculate_loan(&loan),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_implausible_rate_is_a_specific_error() {
        let loan = annuity_loan(dec!(10000), dec!(61), 60);
        assert!(matches!(
            calculate_loan(&loan),
            Err(Error::Validation(ValidationError::AbsurdRate { .. }))
        ));

        // The adjustment margin counts toward the cap.
        let mut adjusted = annuity_loan(dec!(10000), dec!(59), 60);
        adjusted.rate_adjustment = dec!(2);
        assert!(matches!(
            calculate_loan(&adjusted),
            Err(Error::Validation(ValidationError::AbsurdRate { .. }))
        ));
    }

    #[test]
    fn test_term_beyond_horizon_rejected() {
        let loan = annuity_loan(dec!(10000), dec!(5), PAYOFF_HORIZON_MONTHS + 1);
        assert!(matches!(
            calculate_loan(&loan),
            Err(Error::Validation(ValidationError::TermTooLong { .. }))
        ));
    }

    #[test]
    fn test_extreme_but_plausible_inputs_stay_in_range() {
        // The worst case the validators admit: maximum rate over the whole
        // payoff horizon.
        let loan = annuity_loan(dec!(500000), crate::MAX_ANNUAL_RATE_PCT, PAYOFF_HORIZON_MONTHS);
        let schedule = calculate_loan(&loan).unwrap();
        // Payment approaches pure interest: 500_000 * 0.05.
        assert_eq!(schedule.monthly_payment.round_dp(2), dec!(25000.00));
        assert!(schedule.total_interest > dec!(0));
    }

    #[test]
    fn test_solve_term_known_case() {
        // 10_000 at 5% paying 500/month pays off in 21 months.
        let months = solve_term_for_payment(dec!(10000), dec!(5), dec!(500)).unwrap();
        assert_eq!(months, 21);
    }

    #[test]
    fn test_solve_term_zero_rate() {
        let months = solve_term_for_payment(dec!(1000), dec!(0), dec!(300)).unwrap();
        assert_eq!(months, 4);
    }

    #[test]
    fn test_solve_term_payment_below_interest() {
        // First-month interest is 41.67, so a payment of 40 never amortizes.
        let result = solve_term_for_payment(dec!(10000), dec!(5), dec!(40));
        assert!(matches!(result, Err(Error::PaymentTooSmall { .. })));
    }

    #[test]
    fn test_solve_term_beyond_horizon() {
        // Barely above the interest floor, repayment takes centuries.
        let result = solve_term_for_payment(dec!(10000), dec!(5), dec!(41.70));
        assert!(matches!(result, Err(Error::HorizonExceeded { .. })));
    }
}
