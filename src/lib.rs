//! `car_deal_calc` is a Rust library for working out what a car loan really costs.
//!
//! Given a [`VehicleDeal`] (price, rate, term, tax, fees) it computes:
//! - the **amortization schedule**, month by month, split into principal and interest;
//! - the **monthly payment**, with and without tax, plus total interest and total cost;
//! - the **dealer financing markup**: the extra interest paid when the dealer's
//!   rate is above the rate the lender actually offered.
//!
//! Several deals can be ranked side by side with [`compare_deals`].
//!
//! All money is [`rust_decimal::Decimal`] and nothing is rounded; round for display only.
//!
//! ## Usage
//!
//! ```rust
//! use car_deal_calc::{compute_metrics, VehicleDeal};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let deal = VehicleDeal {
//!         listed_price: dec!(32_000),
//!         negotiated_price: dec!(30_000),
//!         apr: dec!(0.05),
//!         term_length: 60,
//!         down_payment: dec!(3_000),
//!         tax_rate: dec!(6),
//!         ..Default::default()
//!     };
//!     let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//!
//!     match compute_metrics(&deal, today) {
//!         Ok(m) => {
//!             println!("Monthly payment: {:.2}", m.monthly_payment);
//!             println!("Total interest:  {:.2}", m.total_interest);
//!             println!("Total cost:      {:.2}", m.total_cost);
//!             println!("Paid off on:     {}", m.payoff_date);
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating deal: {}", e);
//!         }
//!     }
//! }
//! ```

use rust_decimal::Decimal;

pub mod amortization;
pub mod comparison;
pub mod deal;
pub mod error;
pub mod metrics;
pub mod repository;

/// Currency amounts.
pub type Money = Decimal;

/// Annual rates as decimals (0.05 = 5%).
pub type Rate = Decimal;

pub type CarFinanceResult<T> = Result<T, CarFinanceError>;

pub use amortization::{
    monthly_payment, MAX_TERM_MONTHS, payment_schedule as compute_schedule, PaymentScheduleEntry,
};
pub use comparison::{compare_deals, compare_stored_deals, ComparisonSummary, DealComparison};
pub use deal::{DealOverrides, FeeSchedule, VehicleDeal, VehicleDetails};
pub use error::CarFinanceError;
pub use metrics::{compute_metrics, compute_metrics_today, CarCalculations, FeeBreakdown};
pub use repository::{DealRepository, InMemoryDealRepository};
