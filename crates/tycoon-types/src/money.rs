//! Money rounding and invoices.
//!
//! Money is a [`Decimal`] that never carries a fractional part once it has
//! been through [`round_money`]. Every arithmetic step in the economy rounds
//! back to whole units.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Round a value to whole currency units, midpoints away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Multiply and round to whole units. Saturates instead of overflowing.
pub fn mul_money(value: Decimal, factor: Decimal) -> Decimal {
    round_money(value.saturating_mul(factor))
}

/// An immutable invoice: net value, tax and total.
///
/// `tax = round(net * tax_rate)` and `total = round(net + tax)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Invoice {
    title: String,
    #[ts(as = "String")]
    net_value: Decimal,
    #[ts(as = "String")]
    tax_rate: Decimal,
    #[ts(as = "String")]
    tax: Decimal,
    #[ts(as = "String")]
    total: Decimal,
}

impl Invoice {
    /// Build an invoice from its net value.
    pub fn from_net(title: impl Into<String>, net_value: Decimal, tax_rate: Decimal) -> Self {
        let net_value = round_money(net_value);
        let tax = mul_money(net_value, tax_rate);
        Self {
            title: title.into(),
            net_value,
            tax_rate,
            tax,
            total: round_money(net_value.saturating_add(tax)),
        }
    }

    /// Build an invoice from a target total; the net value is back-computed.
    ///
    /// Because both net and tax are rounded, the resulting total may differ
    /// from `total` by one unit.
    pub fn from_total(title: impl Into<String>, total: Decimal, tax_rate: Decimal) -> Self {
        let divisor = Decimal::ONE.saturating_add(tax_rate);
        let net_value = total.checked_div(divisor).unwrap_or(Decimal::ZERO);
        Self::from_net(title, net_value, tax_rate)
    }

    /// Invoice title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Net value, credited to the recipient.
    pub const fn net_value(&self) -> Decimal {
        self.net_value
    }

    /// Tax amount, routed to the treasury.
    pub const fn tax(&self) -> Decimal {
        self.tax
    }

    /// Gross amount debited from the payer.
    pub const fn total(&self) -> Decimal {
        self.total
    }
}
