use rust_decimal::Decimal;
use thiserror::Error;

use crate::{MAX_ANNUAL_RATE_PCT, PAYOFF_HORIZON_MONTHS};

/// A type alias for `Result` using this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for debt calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The monthly budget does not cover the sum of required minimum
    /// payments, so no viable plan exists at this payment level.
    #[error("monthly budget {available} does not cover required minimum payments of {required}")]
    InsufficientBudget {
        required: Decimal,
        available: Decimal,
    },

    /// The fixed payment does not exceed the first month's interest, so the
    /// balance can never amortize.
    #[error("payment {payment} does not exceed monthly interest {interest}, balance cannot amortize")]
    PaymentTooSmall { payment: Decimal, interest: Decimal },

    #[error("repayment would take more than {horizon} months")]
    HorizonExceeded { horizon: u32 },
}

/// Malformed input detected before any calculation runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("interest rate must not be negative, got {0}")]
    NegativeRate(Decimal),

    #[error("interest rate {rate}% exceeds the supported maximum of {max}%")]
    AbsurdRate { rate: Decimal, max: Decimal },

    #[error("term must be a positive number of months")]
    ZeroTerm,

    #[error("term of {months} months exceeds the payoff horizon of {horizon} months")]
    TermTooLong { months: u32, horizon: u32 },

    #[error("payment must be positive, got {0}")]
    NonPositivePayment(Decimal),

    /// A card with a positive balance needs some minimum payment rule,
    /// otherwise the minimum-only simulation can never converge.
    #[error("credit card '{0}' has a positive balance but no minimum payment rule")]
    MissingMinimumPayment(String),
}

pub(crate) fn ensure_non_negative(field: &'static str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() {
        return Err(ValidationError::NegativeAmount { field, value }.into());
    }
    Ok(())
}

pub(crate) fn ensure_plausible_rate(rate: Decimal) -> Result<()> {
    if rate.is_sign_negative() {
        return Err(ValidationError::NegativeRate(rate).into());
    }
    if rate > MAX_ANNUAL_RATE_PCT {
        return Err(ValidationError::AbsurdRate {
            rate,
            max: MAX_ANNUAL_RATE_PCT,
        }
        .into());
    }
    Ok(())
}

pub(crate) fn ensure_term_within_horizon(months: u32) -> Result<()> {
    if months > PAYOFF_HORIZON_MONTHS {
        return Err(ValidationError::TermTooLong {
            months,
            horizon: PAYOFF_HORIZON_MONTHS,
        }
        .into());
    }
    Ok(())
}
