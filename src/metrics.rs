//! Derived financial metrics for a single deal.
//!
//! [`compute_metrics`] is a pure function of the deal and an `as_of` date; the
//! date only feeds the payoff estimate. Everything is recomputed from the deal
//! on every call.

use chrono::{Datelike, Local, Months, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{build_schedule, monthly_payment, PaymentScheduleEntry};
use crate::deal::VehicleDeal;
use crate::error::CarFinanceError;
use crate::{CarFinanceResult, Money, Rate};

/// Fee subtotals as charged on the deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub dealer_fees: Money,
    pub registration_fees: Money,
    pub title_fees: Money,
    pub other_fees: Money,
}

/// Everything the comparison views show for a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarCalculations {
    /// Level payment on price plus tax less down payment.
    pub monthly_payment: Money,
    /// Level payment if the tax were not financed.
    pub monthly_payment_no_tax: Money,
    /// `monthly_payment` plus tax spread evenly over the term. Tax is already
    /// inside `monthly_payment`, so this counts it twice; the figure is kept
    /// as shown to users.
    pub monthly_payment_with_tax: Money,
    pub total_interest: Money,
    pub average_annual_interest: Money,
    pub total_tax: Money,
    /// Down payment + financed amount + interest + fees.
    pub total_cost: Money,
    /// Negotiated price less down payment.
    pub adjusted_cost: Money,
    pub financed_amount: Money,
    /// Listed minus negotiated price; negative when paying over sticker.
    pub discount: Money,
    pub discount_percent: Decimal,
    pub payoff_date: NaiveDate,
    pub payment_schedule: Vec<PaymentScheduleEntry>,
    /// Sell rate minus buy rate, zero when no markup applies.
    pub dealer_financing_markup: Rate,
    /// Extra interest paid because of the markup.
    pub dealer_financing_markup_cost: Money,
    pub total_all_fees: Money,
    pub fees: FeeBreakdown,
}

/// Date the final payment lands: the first of the month after `as_of`, plus
/// the term.
pub fn payoff_date(as_of: NaiveDate, term_months: u32) -> CarFinanceResult<NaiveDate> {
    let start_of_month = NaiveDate::from_ymd_opt(as_of.year(), as_of.month(), 1)
        .ok_or_else(|| CarFinanceError::DateError(format!("no first day for {as_of}")))?;
    term_months
        .checked_add(1)
        .and_then(|months| start_of_month.checked_add_months(Months::new(months)))
        .ok_or_else(|| {
            CarFinanceError::DateError(format!("{term_months} months after {as_of} is out of range"))
        })
}

/// Markup rate and its interest cost, when the buy rate is positive and below
/// the sell rate. Any other buy rate, negative included, yields zeros.
fn dealer_markup(
    deal: &VehicleDeal,
    principal: Money,
    total_interest: Money,
) -> CarFinanceResult<(Rate, Money)> {
    let buy_rate = match deal.buy_rate_apr {
        Some(rate) if rate > Decimal::ZERO && rate < deal.apr => rate,
        _ => return Ok((Decimal::ZERO, Decimal::ZERO)),
    };

    let payment_at_buy_rate = monthly_payment(principal, buy_rate, deal.term_length)?;
    let interest_at_buy_rate = payment_at_buy_rate * Decimal::from(deal.term_length) - principal;

    Ok((deal.apr - buy_rate, total_interest - interest_at_buy_rate))
}

/// Computes every derived metric for `deal`, with `as_of` standing in for today.
///
/// # Errors
///
/// Returns `InvalidInput` for a `term_length` outside
/// `1..=`[`MAX_TERM_MONTHS`](crate::amortization::MAX_TERM_MONTHS) or
/// a negative `apr`.
pub fn compute_metrics(deal: &VehicleDeal, as_of: NaiveDate) -> CarFinanceResult<CarCalculations> {
    let term = deal.term_length;
    let months = Decimal::from(term);

    let tax = deal.effective_tax();
    let principal = deal.principal();
    let payment = monthly_payment(principal, deal.apr, term)?;
    let payment_no_tax = monthly_payment(deal.negotiated_price - deal.down_payment, deal.apr, term)?;
    let payment_with_tax = if tax > Decimal::ZERO {
        payment + tax / months
    } else {
        payment
    };

    let schedule = build_schedule(principal, deal.apr, term)?;
    let total_interest: Money = schedule.iter().map(|e| e.interest_paid).sum();

    let total_fees = deal.fees.total();
    let total_cost = deal.down_payment + principal + total_interest + total_fees;

    let discount = deal.listed_price - deal.negotiated_price;
    let discount_percent = if deal.listed_price > Decimal::ZERO {
        discount / deal.listed_price * dec!(100)
    } else {
        Decimal::ZERO
    };

    let (markup, markup_cost) = dealer_markup(deal, principal, total_interest)?;

    debug!(
        "metrics for deal '{}': payment {payment}, interest {total_interest}, total cost {total_cost}",
        deal.id
    );

    Ok(CarCalculations {
        monthly_payment: payment,
        monthly_payment_no_tax: payment_no_tax,
        monthly_payment_with_tax: payment_with_tax,
        total_interest,
        average_annual_interest: total_interest / months * dec!(12),
        total_tax: tax,
        total_cost,
        adjusted_cost: deal.negotiated_price - deal.down_payment,
        financed_amount: principal,
        discount,
        discount_percent,
        payoff_date: payoff_date(as_of, term)?,
        payment_schedule: schedule,
        dealer_financing_markup: markup,
        dealer_financing_markup_cost: markup_cost,
        total_all_fees: total_fees,
        fees: FeeBreakdown {
            dealer_fees: deal.fees.dealer_fees,
            registration_fees: deal.fees.registration_fees,
            title_fees: deal.fees.title_fees,
            other_fees: deal.fees.other_fees,
        },
    })
}

/// [`compute_metrics`] against the local calendar date.
pub fn compute_metrics_today(deal: &VehicleDeal) -> CarFinanceResult<CarCalculations> {
    compute_metrics(deal, Local::now().date_naive())
}
