//! Vehicle deal records and the transient overrides applied to them.
//!
//! A [`VehicleDeal`] is one financing scenario under consideration. Field names
//! serialize in camelCase so records kept by the browser store deserialize
//! as-is, and every field falls back to its default when absent: missing
//! numbers become zero rather than failing the whole record.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{Money, Rate};

/// Descriptive attributes of the vehicle. The engine never reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleDetails {
    pub make: String,
    pub model: String,
    pub trim: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealership: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_rep_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_rep_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_rep_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Named fee buckets charged on top of the vehicle price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeSchedule {
    pub dealer_fees: Money,
    /// Older records call this bucket `governmentFees`.
    #[serde(alias = "governmentFees")]
    pub registration_fees: Money,
    pub title_fees: Money,
    pub other_fees: Money,
}

impl FeeSchedule {
    pub fn total(&self) -> Money {
        self.dealer_fees + self.registration_fees + self.title_fees + self.other_fees
    }
}

/// One financing scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleDeal {
    pub id: String,
    #[serde(flatten)]
    pub details: VehicleDetails,
    /// Sticker price.
    pub listed_price: Money,
    /// Agreed price before tax and down payment.
    pub negotiated_price: Money,
    /// Rate charged to the buyer as a decimal (0.05 = 5%).
    pub apr: Rate,
    /// Rate the lender offered the dealer. `None`, zero, or anything at or
    /// above `apr` means there is no markup to measure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_rate_apr: Option<Rate>,
    /// Loan term in months.
    pub term_length: u32,
    pub down_payment: Money,
    /// Sales tax in percentage points (7.5 = 7.5%).
    pub tax_rate: Decimal,
    /// Flat tax amount, used only when `tax_rate` does not apply.
    pub tax: Money,
    #[serde(flatten)]
    pub fees: FeeSchedule,
}

impl VehicleDeal {
    /// Tax owed on the deal.
    ///
    /// A positive `tax_rate` on a positive negotiated price always wins over the
    /// stored `tax`; otherwise the stored amount is treated as a flat fee.
    pub fn effective_tax(&self) -> Money {
        if self.tax_rate > Decimal::ZERO && self.negotiated_price > Decimal::ZERO {
            self.negotiated_price * self.tax_rate / dec!(100)
        } else {
            self.tax
        }
    }

    /// Amount financed: negotiated price plus tax, less the down payment.
    pub fn principal(&self) -> Money {
        self.negotiated_price + self.effective_tax() - self.down_payment
    }

    /// Short human-readable name, falling back to the id.
    pub fn label(&self) -> String {
        let d = &self.details;
        let mut parts: Vec<String> = Vec::new();
        if let Some(year) = d.year {
            parts.push(year.to_string());
        }
        for part in [&d.make, &d.model, &d.trim] {
            if !part.trim().is_empty() {
                parts.push(part.trim().to_string());
            }
        }
        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Returns a copy of the deal with the given overrides applied.
    pub fn with_overrides(&self, overrides: &DealOverrides) -> VehicleDeal {
        if overrides.is_empty() {
            return self.clone();
        }
        let mut deal = self.clone();
        if let Some(down_payment) = overrides.down_payment {
            deal.down_payment = down_payment;
        }
        if let Some(apr) = overrides.apr {
            deal.apr = apr;
        }
        if let Some(term_length) = overrides.term_length {
            deal.term_length = term_length;
        }
        deal
    }
}

/// What-if values applied on top of a stored deal without touching it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apr: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_length: Option<u32>,
}

impl DealOverrides {
    pub fn is_empty(&self) -> bool {
        self.down_payment.is_none() && self.apr.is_none() && self.term_length.is_none()
    }
}
