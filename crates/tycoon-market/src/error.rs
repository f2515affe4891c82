//! Error types for the market.
//!
//! Each public operation has its own error enum so callers can match on the
//! failures that operation can actually produce.

use tycoon_ledger::FinancialTransactionError;
use tycoon_types::{MapPoint, PlayerId, PropertyId, PropertyKind};
use tycoon_world::WorldError;

/// Errors raised by a [`MarketStore`](crate::store::MarketStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Another property is already recorded at the address.
    #[error("a property is already recorded at {0}")]
    DuplicateProperty(MapPoint),

    /// No property with this id.
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),

    /// An advert is already active at the address.
    #[error("an advert already exists at {0}")]
    AdvertAlreadyExists(MapPoint),

    /// No advert at the address.
    #[error("no advert at {0}")]
    AdvertNotFound(MapPoint),

    /// The backing storage is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(&'static str),
}

/// Errors raised by a [`ConstructionQuoter`](crate::quote::ConstructionQuoter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// The kind has no construction works (bare land).
    #[error("{} cannot be constructed", .0.display_name())]
    NotConstructible(PropertyKind),
}

/// Errors raised while valuing a property.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValuationError {
    /// Reading properties or parking states failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The construction quoter refused to price the property.
    #[error(transparent)]
    Quote(#[from] QuoteError),
}

/// Errors from [`MarketAgent::register_sale_offer`](crate::MarketAgent::register_sale_offer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterOfferError {
    /// Nothing is recorded at the address.
    #[error("no property at {0}")]
    PropertyDoesNotExist(MapPoint),

    /// The property is already advertised.
    #[error("an advert already exists at {0}")]
    AdvertAlreadyExists(MapPoint),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Errors from [`MarketAgent::update_sale_offer`](crate::MarketAgent::update_sale_offer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateOfferError {
    /// No advert at the address.
    #[error("no sale offer at {0}")]
    OfferDoesNotExist(MapPoint),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Errors from [`MarketAgent::buy_property`](crate::MarketAgent::buy_property).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuyPropertyError {
    /// No advert and no implicit government offer at the address.
    #[error("property at {0} is not for sale")]
    PropertyNotForSale(MapPoint),

    /// The buyer already owns the property.
    #[error("player {0} already owns this property")]
    TryingBuyOwnProperty(PlayerId),

    /// The price changed since the buyer saw it.
    #[error("sale offer has changed: expected {expected}, now {actual}")]
    SaleOfferHasChanged {
        /// Price the buyer agreed to.
        expected: rust_decimal::Decimal,
        /// Current price.
        actual: rust_decimal::Decimal,
    },

    /// The sale or commission transaction failed.
    #[error("financial transaction failed: {0}")]
    FinancialTransactionProblem(#[from] FinancialTransactionError),

    /// Resolving the offer price failed.
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Refreshing the map tile failed.
    #[error(transparent)]
    Map(#[from] WorldError),
}

/// Errors from construction operations on [`MarketAgent`](crate::MarketAgent).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// Nothing is recorded at the address.
    #[error("no property at {0}")]
    PropertyDoesNotExist(MapPoint),

    /// The player does not own the property.
    #[error("player {0} does not own this property")]
    NotOwner(PlayerId),

    /// Only ready, undeveloped land can be built on.
    #[error("property at {0} is not buildable land")]
    NotBuildable(MapPoint),

    /// The target is bare land.
    #[error("cannot construct {}", .0.display_name())]
    InvalidTarget(PropertyKind),

    /// Pricing the works failed.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// Charging the owner failed.
    #[error("financial transaction failed: {0}")]
    FinancialTransactionProblem(#[from] FinancialTransactionError),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Refreshing the map tile failed.
    #[error(transparent)]
    Map(#[from] WorldError),
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn messages_name_the_address() {
        let p = MapPoint::new(3, 4);
        assert_eq!(
            RegisterOfferError::PropertyDoesNotExist(p).to_string(),
            "no property at (3, 4)"
        );
        assert_eq!(
            BuyPropertyError::PropertyNotForSale(p).to_string(),
            "property at (3, 4) is not for sale"
        );
    }

    #[test]
    fn store_errors_convert() {
        let err: RegisterOfferError = StoreError::Unavailable("down").into();
        assert!(matches!(err, RegisterOfferError::Storage(_)));

        let err: BuyPropertyError = ValuationError::from(QuoteError::NotConstructible(
            PropertyKind::Land,
        ))
        .into();
        assert_eq!(err.to_string(), "land cannot be constructed");
    }

    #[test]
    fn stale_price_reports_both_prices() {
        let err = BuyPropertyError::SaleOfferHasChanged {
            expected: dec!(100),
            actual: dec!(120),
        };
        assert_eq!(err.to_string(), "sale offer has changed: expected 100, now 120");
    }
}
