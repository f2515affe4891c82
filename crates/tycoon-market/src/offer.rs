//! Sale offers and purchase receipts.

use rust_decimal::Decimal;
use serde::Serialize;

use tycoon_types::{Invoice, MapPoint, PlayerId, PropertyId, PropertyKind};

/// Where a sale offer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferSource {
    /// The owner published an advert.
    Advert,
    /// Government land sold at the estimated value without an advert.
    Government,
}

/// A resolved offer: who sells what for how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleOffer {
    /// Address of the property.
    pub address: MapPoint,
    /// Current owner.
    pub seller_id: PlayerId,
    /// Player the invoices were drawn up for.
    pub buyer_id: PlayerId,
    /// Property kind.
    pub kind: PropertyKind,
    /// Asking net price.
    pub net_price: Decimal,
    /// Invoice paid to the seller.
    pub sale_invoice: Invoice,
    /// Invoice paid to the agency.
    pub commission_invoice: Invoice,
    /// Advert or implicit government offer.
    pub source: OfferSource,
}

impl SaleOffer {
    /// Everything the buyer pays, taxes included.
    pub fn total_cost(&self) -> Decimal {
        self.sale_invoice
            .total()
            .saturating_add(self.commission_invoice.total())
    }
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    /// The property that changed hands.
    pub property_id: PropertyId,
    /// Its address.
    pub address: MapPoint,
    /// Property kind.
    pub kind: PropertyKind,
    /// Previous owner.
    pub seller_id: PlayerId,
    /// New owner.
    pub buyer_id: PlayerId,
    /// Net price paid to the seller.
    pub net_price: Decimal,
    /// Net commission paid to the agency.
    pub commission: Decimal,
    /// Income tax refunded to the seller, if any.
    pub income_tax_refund: Option<Decimal>,
}
