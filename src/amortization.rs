//! Fixed-rate loan amortization.
//!
//! The level payment is `PMT = P * r(1 + r)^n / ((1 + r)^n - 1)` with the
//! monthly rate `r = apr / 12`. A zero rate has no amortization factor and
//! is repaid straight-line instead. Nothing here rounds; callers round for
//! display only.

use log::trace;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::deal::VehicleDeal;
use crate::error::CarFinanceError;
use crate::{CarFinanceResult, Money, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Longest loan term accepted, in months (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

/// One month of the repayment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentScheduleEntry {
    /// 1-based month number.
    pub month: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
    /// Balance after this payment, floored at zero.
    pub remaining_balance: Money,
}

/// Converts an annual rate into the periodic rate applied each month.
pub fn monthly_rate(apr: Rate) -> Rate {
    apr / MONTHS_PER_YEAR
}

fn check_terms(apr: Rate, term_months: u32) -> CarFinanceResult<()> {
    if term_months == 0 {
        return Err(CarFinanceError::invalid(
            "termLength",
            "loan term must be at least one month",
        ));
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(CarFinanceError::invalid(
            "termLength",
            &format!("loan term cannot exceed {MAX_TERM_MONTHS} months"),
        ));
    }
    if apr < Decimal::ZERO {
        return Err(CarFinanceError::invalid("apr", "rate cannot be negative"));
    }
    Ok(())
}

/// Level monthly payment that retires `principal` over `term_months`.
///
/// A negative principal (down payment larger than the price) still produces a
/// number. Fails only for a term outside `1..=MAX_TERM_MONTHS`, a negative
/// rate, or a compounding factor too large to represent.
pub fn monthly_payment(principal: Money, apr: Rate, term_months: u32) -> CarFinanceResult<Money> {
    check_terms(apr, term_months)?;

    let months = Decimal::from(term_months);
    if apr.is_zero() {
        return Ok(principal / months);
    }

    let rate = monthly_rate(apr);
    let overflow =
        || CarFinanceError::Overflow(format!("amortization factor for {term_months} months"));
    let factor = (Decimal::ONE + rate)
        .checked_powu(term_months.into())
        .ok_or_else(overflow)?;
    let denominator = factor - Decimal::ONE;

    // Rates too small to move the factor at 28 digits behave like zero.
    if denominator.is_zero() {
        return Ok(principal / months);
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(overflow)
}

/// Month-by-month schedule for a loan of `principal` at `apr`.
///
/// The working balance carries any tiny negative drift into the next month;
/// only the reported `remaining_balance` is clamped.
pub fn build_schedule(
    principal: Money,
    apr: Rate,
    term_months: u32,
) -> CarFinanceResult<Vec<PaymentScheduleEntry>> {
    let payment = monthly_payment(principal, apr, term_months)?;
    let rate = monthly_rate(apr);

    let mut balance = principal;
    let mut cumulative_principal = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;
    let mut schedule = Vec::with_capacity(term_months as usize);

    for month in 1..=term_months {
        let interest_paid = balance * rate;
        let principal_paid = payment - interest_paid;
        balance -= principal_paid;
        cumulative_principal += principal_paid;
        cumulative_interest += interest_paid;

        schedule.push(PaymentScheduleEntry {
            month,
            principal_paid,
            interest_paid,
            cumulative_principal,
            cumulative_interest,
            remaining_balance: balance.max(Decimal::ZERO),
        });
    }

    trace!(
        "built {term_months}-month schedule for principal {principal} at {apr}: payment {payment}"
    );
    Ok(schedule)
}

/// Repayment schedule for a deal, financing price plus tax less down payment.
pub fn payment_schedule(deal: &VehicleDeal) -> CarFinanceResult<Vec<PaymentScheduleEntry>> {
    build_schedule(deal.principal(), deal.apr, deal.term_length)
}
