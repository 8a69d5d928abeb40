//! What-if analysis on top of the strategy planner: lump-sum extra
//! payments, side-by-side scenario comparison and loan focus
//! recommendations.
//!
//! Every comparison here is measured against the same baseline: paying
//! exactly the sum of minimum payments. Savings are only reported as
//! numbers when both plans actually pay off; a plan that never pays off
//! has no finite interest total to subtract.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::debt::{DebtItem, Strategy};
use crate::error::{Result, ensure_non_negative};
use crate::loan::{Loan, LoanKind, calculate_loan};
use crate::planner::{PaymentPlan, generate_payment_plan};
use crate::summary::InterestTotal;

/// A candidate budget/strategy combination to evaluate against the
/// minimum-payment baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    /// Budget on top of the sum of minimum payments, every month.
    pub extra_monthly_payment: Decimal,
    pub strategy: Strategy,
}

/// How one scenario performs against the minimum-payment baseline.
///
/// The `*_saved` fields are `None` whenever either plan never pays off;
/// the raw totals are still present for callers that want to branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenario_id: String,
    pub scenario_name: String,
    pub months: u32,
    pub total_interest: InterestTotal,
    pub total_paid: Decimal,
    pub months_saved: Option<i64>,
    pub interest_saved: Option<Decimal>,
    pub money_saved: Option<Decimal>,
}

/// Effect of a one-time lump-sum payment against a single debt, with the
/// monthly budget held at the sum of minimum payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentImpact {
    pub amount: Decimal,
    pub new_months: u32,
    pub original_total_interest: InterestTotal,
    pub new_total_interest: InterestTotal,
    pub months_saved: Option<i64>,
    pub interest_saved: Option<Decimal>,
}

/// A consolidation loan offer: one annuity loan replacing the whole debt
/// set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationOption {
    pub name: String,
    pub annual_rate: Decimal,
    pub term_months: u32,
}

/// A consolidation option priced against the current debts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationQuote {
    pub name: String,
    pub monthly_payment: Decimal,
    pub total_interest: Decimal,
    pub months_saved: Option<i64>,
    pub interest_saved: Option<Decimal>,
}

/// Loans worth attacking first, by id: the ones at the highest rate, the
/// ones costing the most lifetime interest, and the overlap of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecommendations {
    pub highest_rate: Vec<String>,
    pub highest_total_interest: Vec<String>,
    pub top_priority: Vec<String>,
}

fn minimum_budget(debts: &[DebtItem]) -> Decimal {
    debts
        .iter()
        .filter(|d| d.is_active && d.balance > dec!(0))
        .map(|d| d.min_payment)
        .sum()
}

fn savings(
    baseline: &PaymentPlan,
    candidate: &PaymentPlan,
) -> (Option<i64>, Option<Decimal>, Option<Decimal>) {
    match (
        baseline.total_interest.as_finite(),
        candidate.total_interest.as_finite(),
    ) {
        (Some(base_interest), Some(new_interest)) => (
            Some(i64::from(baseline.months) - i64::from(candidate.months)),
            Some(base_interest - new_interest),
            Some(baseline.total_paid - candidate.total_paid),
        ),
        _ => (None, None, None),
    }
}

/// Evaluates what-if scenarios against the baseline of paying exactly the
/// minimums under the avalanche strategy.
///
/// Each scenario is planned with the baseline budget plus its extra
/// monthly payment, under its own strategy. Results come back in input
/// order.
///
/// # Errors
///
/// Propagates planner errors, and rejects a negative extra payment as a
/// validation error.
pub fn compare_scenarios(
    debts: &[DebtItem],
    scenarios: &[Scenario],
) -> Result<Vec<ScenarioComparison>> {
    let budget = minimum_budget(debts);
    let baseline = generate_payment_plan(debts, budget, Strategy::Avalanche)?;

    let mut comparisons = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        ensure_non_negative("extra_monthly_payment", scenario.extra_monthly_payment)?;
        let plan =
            generate_payment_plan(debts, budget + scenario.extra_monthly_payment, scenario.strategy)?;
        let (months_saved, interest_saved, money_saved) = savings(&baseline, &plan);
        comparisons.push(ScenarioComparison {
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            months: plan.months,
            total_interest: plan.total_interest,
            total_paid: plan.total_paid,
            months_saved,
            interest_saved,
            money_saved,
        });
    }
    Ok(comparisons)
}

/// Measures the impact of paying `amount` once against the debt with
/// `debt_id`, keeping the monthly budget at the sum of minimums.
///
/// The target debt's balance is reduced up front, floored at zero, and the
/// plan is regenerated under the same strategy. An id that matches no debt
/// reduces nothing, so the impact comes back as zero savings.
///
/// # Errors
///
/// Propagates planner errors, and rejects a negative amount as a
/// validation error.
pub fn extra_payment_impact(
    debts: &[DebtItem],
    amount: Decimal,
    debt_id: &str,
    strategy: Strategy,
) -> Result<ExtraPaymentImpact> {
    ensure_non_negative("amount", amount)?;

    let budget = minimum_budget(debts);
    let baseline = generate_payment_plan(debts, budget, strategy)?;

    let reduced: Vec<DebtItem> = debts
        .iter()
        .cloned()
        .map(|mut debt| {
            if debt.id == debt_id {
                debt.balance = (debt.balance - amount).max(dec!(0));
            }
            debt
        })
        .collect();
    let plan = generate_payment_plan(&reduced, budget, strategy)?;

    let (months_saved, interest_saved, _) = savings(&baseline, &plan);
    Ok(ExtraPaymentImpact {
        amount,
        new_months: plan.months,
        original_total_interest: baseline.total_interest,
        new_total_interest: plan.total_interest,
        months_saved,
        interest_saved,
    })
}

/// Prices consolidation offers: each option rolls the whole active balance
/// into a single annuity loan, compared against the avalanche plan at the
/// sum of current minimums.
///
/// # Errors
///
/// Propagates planner errors, and rejects malformed options (implausible
/// rate, zero term or a term beyond the payoff horizon) as validation
/// errors.
pub fn consolidation_options(
    debts: &[DebtItem],
    options: &[ConsolidationOption],
) -> Result<Vec<ConsolidationQuote>> {
    let baseline = generate_payment_plan(debts, minimum_budget(debts), Strategy::Avalanche)?;
    let total_balance: Decimal = debts
        .iter()
        .filter(|d| d.is_active && d.balance > dec!(0))
        .map(|d| d.balance)
        .sum();

    let mut quotes = Vec::with_capacity(options.len());
    for option in options {
        let consolidated = Loan {
            id: option.name.clone(),
            name: option.name.clone(),
            principal: total_balance,
            annual_rate: option.annual_rate,
            rate_adjustment: dec!(0),
            term_months: option.term_months,
            monthly_fee: dec!(0),
            kind: LoanKind::Annuity,
            is_active: true,
        };
        let schedule = calculate_loan(&consolidated)?;
        let (months_saved, interest_saved) = match baseline.total_interest.as_finite() {
            Some(base_interest) => (
                Some(i64::from(baseline.months) - i64::from(option.term_months)),
                Some(base_interest - schedule.total_interest),
            ),
            None => (None, None),
        };
        quotes.push(ConsolidationQuote {
            name: option.name.clone(),
            monthly_payment: schedule.monthly_payment,
            total_interest: schedule.total_interest,
            months_saved,
            interest_saved,
        });
    }
    Ok(quotes)
}

/// Ranks active loans by effective rate and by lifetime interest cost,
/// surfacing the loans that appear at the top of both rankings.
///
/// # Errors
///
/// Returns a validation error when any active loan is malformed.
pub fn recommend_loan_focus(loans: &[Loan]) -> Result<LoanRecommendations> {
    let mut costs: Vec<(&Loan, Decimal)> = Vec::new();
    for loan in loans.iter().filter(|l| l.is_active) {
        let schedule = calculate_loan(loan)?;
        costs.push((loan, schedule.total_interest));
    }
    let Some(max_rate) = costs.iter().map(|(l, _)| l.effective_rate()).max() else {
        return Ok(LoanRecommendations {
            highest_rate: Vec::new(),
            highest_total_interest: Vec::new(),
            top_priority: Vec::new(),
        });
    };
    let max_interest = costs.iter().map(|(_, cost)| *cost).max().unwrap_or(dec!(0));

    let highest_rate: Vec<String> = costs
        .iter()
        .filter(|(l, _)| l.effective_rate() == max_rate)
        .map(|(l, _)| l.id.clone())
        .collect();
    let highest_total_interest: Vec<String> = costs
        .iter()
        .filter(|(_, cost)| *cost == max_interest)
        .map(|(l, _)| l.id.clone())
        .collect();
    let top_priority: Vec<String> = highest_rate
        .iter()
        .filter(|id| highest_total_interest.contains(id))
        .cloned()
        .collect();

    Ok(LoanRecommendations {
        highest_rate,
        highest_total_interest,
        top_priority,
    })
}
