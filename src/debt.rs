//! A common debt representation shared by the strategy planner, plus the
//! prioritization rules for each repayment strategy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::credit_card::{CreditCard, calculate_credit_card};
use crate::error::{Result, ensure_non_negative, ensure_plausible_rate};
use crate::loan::{Loan, calculate_loan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebtKind {
    Loan,
    CreditCard,
}

/// Repayment prioritization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// All discretionary payment to the highest-rate debt.
    Avalanche,
    /// All discretionary payment to the smallest-balance debt.
    Snowball,
    /// Discretionary payment split across debts in proportion to balance.
    Equal,
}

/// A loan or credit card reduced to what the planner needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtItem {
    pub id: String,
    pub name: String,
    pub kind: DebtKind,
    pub balance: Decimal,
    /// Annual interest rate as a percentage, margin already applied.
    pub annual_rate: Decimal,
    pub min_payment: Decimal,
    /// Remaining term in months, for loans.
    pub remaining_term: Option<u32>,
    pub is_active: bool,
}

impl DebtItem {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("balance", self.balance)?;
        ensure_non_negative("min_payment", self.min_payment)?;
        ensure_plausible_rate(self.annual_rate)?;
        Ok(())
    }

    /// Reduces a loan to a planner debt. The minimum payment is the computed
    /// amortized payment plus the monthly servicing fee.
    pub fn from_loan(loan: &Loan) -> Result<DebtItem> {
        let schedule = calculate_loan(loan)?;
        Ok(DebtItem {
            id: loan.id.clone(),
            name: loan.name.clone(),
            kind: DebtKind::Loan,
            balance: loan.principal,
            annual_rate: loan.effective_rate(),
            min_payment: schedule.monthly_payment + loan.monthly_fee,
            remaining_term: Some(loan.term_months),
            is_active: loan.is_active,
        })
    }

    /// Reduces a card to a planner debt. The minimum payment is the card's
    /// effective minimum at the current balance.
    pub fn from_credit_card(card: &CreditCard) -> Result<DebtItem> {
        let summary = calculate_credit_card(card)?;
        Ok(DebtItem {
            id: card.id.clone(),
            name: card.name.clone(),
            kind: DebtKind::CreditCard,
            balance: card.balance,
            annual_rate: card.apr,
            min_payment: summary.effective_payment,
            remaining_term: None,
            is_active: card.is_active,
        })
    }
}

/// Combines active loans and cards into a single planner debt set, in input
/// order (loans first).
pub fn combine_debts(loans: &[Loan], cards: &[CreditCard]) -> Result<Vec<DebtItem>> {
    let mut debts = Vec::with_capacity(loans.len() + cards.len());
    for loan in loans.iter().filter(|l| l.is_active) {
        debts.push(DebtItem::from_loan(loan)?);
    }
    for card in cards.iter().filter(|c| c.is_active) {
        debts.push(DebtItem::from_credit_card(card)?);
    }
    Ok(debts)
}

/// Returns the indices of active, positive-balance debts in allocation
/// order for the given strategy.
///
/// Avalanche orders by highest rate, breaking ties by larger balance;
/// snowball by smallest balance, breaking ties by higher rate. Both fall
/// back to input order, which the stable sort preserves. `Equal` keeps
/// input order since its split does not depend on ordering.
pub fn prioritize(debts: &[DebtItem], strategy: Strategy) -> Vec<usize> {
    let mut order: Vec<usize> = debts
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_active && d.balance > dec!(0))
        .map(|(i, _)| i)
        .collect();

    match strategy {
        Strategy::Avalanche => order.sort_by(|&a, &b| {
            debts[b]
                .annual_rate
                .cmp(&debts[a].annual_rate)
                .then(debts[b].balance.cmp(&debts[a].balance))
        }),
        Strategy::Snowball => order.sort_by(|&a, &b| {
            debts[a]
                .balance
                .cmp(&debts[b].balance)
                .then(debts[b].annual_rate.cmp(&debts[a].annual_rate))
        }),
        Strategy::Equal => {}
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credit_card::CreditCard;
    use crate::loan::LoanKind;
    use rust_decimal_macros::dec;

    fn debt(id: &str, balance: Decimal, rate: Decimal) -> DebtItem {
        DebtItem {
            id: id.to_string(),
            name: id.to_string(),
            kind: DebtKind::Loan,
            balance,
            annual_rate: rate,
            min_payment: dec!(50),
            remaining_term: None,
            is_active: true,
        }
    }

    #[test]
    fn test_avalanche_orders_by_rate_then_balance() {
        let debts = vec![
            debt("a", dec!(1000), dec!(10)),
            debt("b", dec!(500), dec!(20)),
            debt("c", dec!(2000), dec!(20)),
        ];
        let order = prioritize(&debts, Strategy::Avalanche);
        // Both b and c carry 20%, the larger balance goes first.
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_snowball_orders_by_balance_then_rate() {
        let debts = vec![
            debt("a", dec!(500), dec!(10)),
            debt("b", dec!(500), dec!(20)),
            debt("c", dec!(2000), dec!(5)),
        ];
        let order = prioritize(&debts, Strategy::Snowball);
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn test_prioritize_skips_inactive_and_settled() {
        let settled = debt("a", dec!(0), dec!(30));
        let mut inactive = debt("b", dec!(1000), dec!(30));
        inactive.is_active = false;
        let debts = vec![settled, inactive, debt("c", dec!(100), dec!(5))];
        assert_eq!(prioritize(&debts, Strategy::Avalanche), vec![2]);
    }

    #[test]
    fn test_equal_keeps_input_order() {
        let debts = vec![
            debt("a", dec!(900), dec!(10)),
            debt("b", dec!(100), dec!(30)),
        ];
        assert_eq!(prioritize(&debts, Strategy::Equal), vec![0, 1]);
    }

    #[test]
    fn test_implausible_rate_rejected() {
        use crate::error::Error;
        let item = debt("shark", dec!(1000), dec!(120));
        assert!(matches!(item.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_from_loan_uses_amortized_payment_plus_fee() {
        let loan = Loan {
            id: "l1".to_string(),
            name: "Car".to_string(),
            principal: dec!(10000),
            annual_rate: dec!(5),
            rate_adjustment: dec!(0),
            term_months: 60,
            monthly_fee: dec!(5),
            kind: LoanKind::Annuity,
            is_active: true,
        };
        let item = DebtItem::from_loan(&loan).unwrap();
        assert_eq!(item.min_payment.round_dp(2), dec!(193.71));
        assert_eq!(item.balance, dec!(10000));
        assert_eq!(item.remaining_term, Some(60));
    }

    #[test]
    fn test_from_credit_card_uses_effective_minimum() {
        let card = CreditCard {
            id: "c1".to_string(),
            name: "Visa".to_string(),
            balance: dec!(2000),
            apr: dec!(18),
            min_payment: dec!(30),
            min_payment_percent: dec!(2),
            credit_limit: dec!(4000),
            pays_in_full: false,
            is_active: true,
        };
        let item = DebtItem::from_credit_card(&card).unwrap();
        assert_eq!(item.min_payment, dec!(40));
        assert_eq!(item.kind, DebtKind::CreditCard);
    }
}
