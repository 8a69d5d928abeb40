//! `debt_payoff` is a Rust library for planning the repayment of a set of
//! consumer debts.
//!
//! It covers the three calculation layers of a debt-management tool:
//! - **Per-loan amortization** ([`calculate_loan`]): annuity,
//!   equal-principal and fixed-installment schedules, plus the inverse
//!   problem of solving the term for a fixed payment.
//! - **Credit card simulation** ([`calculate_credit_card`]): monthly
//!   interest, effective minimum payments and the minimum-only payoff
//!   trajectory, with an explicit never-pays-off outcome for balances that
//!   cannot amortize.
//! - **Multi-debt strategy planning** ([`generate_payment_plan`]): a
//!   month-by-month simulation that allocates a fixed budget across
//!   heterogeneous debts under the avalanche, snowball or equal strategy.
//!
//! On top of the planner, the [`scenario`] module answers what-if
//! questions: the impact of a lump-sum extra payment and side-by-side
//! comparison of budget/strategy combinations against the minimum-payment
//! baseline.
//!
//! All monetary math uses [`rust_decimal::Decimal`]; every simulation is
//! bounded by [`PAYOFF_HORIZON_MONTHS`], so adversarial inputs terminate
//! with a reported condition instead of looping.
//!
//! ## Usage
//!
//! ```rust
//! use debt_payoff::{DebtItem, DebtKind, Strategy, generate_payment_plan};
//! use rust_decimal_macros::dec;
//!
//! let debts = vec![
//!     DebtItem {
//!         id: "car".to_string(),
//!         name: "Car loan".to_string(),
//!         kind: DebtKind::Loan,
//!         balance: dec!(8000),
//!         annual_rate: dec!(6),
//!         min_payment: dec!(160),
//!         remaining_term: Some(60),
//!         is_active: true,
//!     },
//!     DebtItem {
//!         id: "visa".to_string(),
//!         name: "Visa".to_string(),
//!         kind: DebtKind::CreditCard,
//!         balance: dec!(2500),
//!         annual_rate: dec!(19),
//!         min_payment: dec!(75),
//!         remaining_term: None,
//!         is_active: true,
//!     },
//! ];
//!
//! let plan = generate_payment_plan(&debts, dec!(400), Strategy::Avalanche)?;
//! println!("debt free in {} months", plan.months);
//! if let Some(total) = plan.total_interest.as_finite() {
//!     println!("total interest: {:.2}", total);
//! }
//! # Ok::<(), debt_payoff::Error>(())
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub mod cache;
pub mod credit_card;
pub mod debt;
pub mod error;
pub mod loan;
pub mod planner;
pub mod scenario;
pub mod summary;

/// Hard cap on every iterative simulation, 100 years of months. Inputs
/// that cannot pay off within it are reported as never paying off.
pub const PAYOFF_HORIZON_MONTHS: u32 = 1200;

/// Upper bound on annual interest rates, in percent. Rates above it are
/// rejected as implausible; together with the term cap it also keeps every
/// amortization formula within `Decimal` range.
pub const MAX_ANNUAL_RATE_PCT: Decimal = dec!(60);

pub use cache::PlanCache;
pub use credit_card::{
    CardPortfolioTotals, CardSummary, CreditCard, PayoffProjection, calculate_credit_card,
    card_portfolio_totals, effective_min_payment, minimum_only_projection, monthly_interest,
};
pub use debt::{DebtItem, DebtKind, Strategy, combine_debts, prioritize};
pub use error::{Error, Result, ValidationError};
pub use loan::{
    Loan, LoanKind, LoanSchedule, MonthSplit, calculate_loan, monthly_periodic_rate,
    solve_term_for_payment,
};
pub use planner::{DebtPayment, MonthEntry, PaymentPlan, generate_payment_plan};
pub use scenario::{
    ConsolidationOption, ConsolidationQuote, ExtraPaymentImpact, LoanRecommendations, Scenario,
    ScenarioComparison, compare_scenarios, consolidation_options, extra_payment_impact,
    recommend_loan_focus,
};
pub use summary::{InterestTotal, PortfolioSummary, debt_free_date, summarize_portfolio};
