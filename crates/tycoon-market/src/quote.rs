//! Construction pricing.

use rust_decimal::Decimal;

use tycoon_types::{Invoice, PropertyKind, round_money};

use crate::config::{ConstructionConfig, TaxConfig};
use crate::error::QuoteError;

/// Price and duration of construction works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionQuote {
    /// Invoice for the works, payable to the government.
    pub invoice: Invoice,
    /// Months until the works finish.
    pub duration_months: u32,
}

/// Prices construction works.
pub trait ConstructionQuoter: Send + Sync {
    /// Quote building `kind`; `storeys` applies to residential buildings.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::NotConstructible`] for bare land.
    fn quote(&self, kind: PropertyKind, storeys: Option<u8>) -> Result<ConstructionQuote, QuoteError>;
}

/// Quoter backed by the configured price list.
#[derive(Debug, Clone)]
pub struct PriceListQuoter {
    prices: ConstructionConfig,
    tax_rate: Decimal,
}

impl PriceListQuoter {
    /// Build a quoter from the construction price list and tax rates.
    pub const fn new(prices: ConstructionConfig, taxes: &TaxConfig) -> Self {
        Self {
            prices,
            tax_rate: taxes.construction,
        }
    }
}

impl ConstructionQuoter for PriceListQuoter {
    fn quote(&self, kind: PropertyKind, storeys: Option<u8>) -> Result<ConstructionQuote, QuoteError> {
        let p = &self.prices;
        let (net, months) = match kind {
            PropertyKind::Land => return Err(QuoteError::NotConstructible(kind)),
            PropertyKind::Road => (p.road_cost, p.road_months),
            PropertyKind::Parking => (p.parking_cost, p.parking_months),
            PropertyKind::ResidentialBuilding => {
                let storeys = storeys.unwrap_or(p.default_storeys).max(1);
                let per_storey = round_money(
                    p.residential_storey_cost
                        .saturating_mul(Decimal::from(storeys)),
                );
                let extra_months = u32::from(storeys)
                    .checked_div(p.storeys_per_month)
                    .unwrap_or(0);
                (
                    round_money(p.residential_base_cost.saturating_add(per_storey)),
                    p.residential_base_months.saturating_add(extra_months),
                )
            }
        };

        let title = format!("Construction of {}", kind.display_name());
        Ok(ConstructionQuote {
            invoice: Invoice::from_net(title, net, self.tax_rate),
            duration_months: months,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn quoter() -> PriceListQuoter {
        PriceListQuoter::new(ConstructionConfig::default(), &TaxConfig::default())
    }

    #[test]
    fn land_is_not_constructible() {
        assert_eq!(
            quoter().quote(PropertyKind::Land, None),
            Err(QuoteError::NotConstructible(PropertyKind::Land))
        );
    }

    #[test]
    fn parking_uses_price_list() {
        let quote = quoter().quote(PropertyKind::Parking, None);
        assert!(quote.is_ok());
        if let Ok(q) = quote {
            assert_eq!(q.invoice.net_value(), dec!(45_000));
            // 8% construction tax
            assert_eq!(q.invoice.tax(), dec!(3_600));
            assert_eq!(q.duration_months, 2);
        }
    }

    #[test]
    fn residential_scales_with_storeys() {
        let q = quoter();
        let four = q.quote(PropertyKind::ResidentialBuilding, Some(4)).ok();
        let ten = q.quote(PropertyKind::ResidentialBuilding, Some(10)).ok();
        assert_eq!(four.as_ref().map(|q| q.invoice.net_value()), Some(dec!(390_000)));
        assert_eq!(four.map(|q| q.duration_months), Some(5));
        assert_eq!(ten.as_ref().map(|q| q.invoice.net_value()), Some(dec!(750_000)));
        assert_eq!(ten.map(|q| q.duration_months), Some(8));
    }

    #[test]
    fn missing_storeys_use_default() {
        let q = quoter();
        assert_eq!(
            q.quote(PropertyKind::ResidentialBuilding, None).ok(),
            q.quote(PropertyKind::ResidentialBuilding, Some(4)).ok()
        );
    }
}
