//! The market agent: adverts, purchases and construction.
//!
//! # Purchase protocol
//!
//! Purchases run one at a time behind a single lock. Inside the lock the
//! agent resolves the offer, checks the buyer's expected price, then asks
//! the ledger for two transactions: the sale (buyer to seller) and the
//! commission (buyer to agency). The legs are independent ledger
//! transactions. When the commission fails after the sale went through, the
//! sale stays paid and the error is returned.
//!
//! After both legs the property, register, map tile and advert are
//! updated, and a non-system seller may receive an income tax refund.
//! Events are emitted once the lock has been released.

use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use tracing::{info, warn};

use tycoon_ledger::TransactionBuilder;
use tycoon_types::{
    ConstructionState, Invoice, MapPoint, ParkingState, PlayerId, Property, PropertyDetails,
    PropertyKind, PropertyRegister, SaleAdvert, TileType, TransactionKind, round_money,
};

use crate::commission::commission_invoice;
use crate::context::MarketContext;
use crate::error::{
    BuyPropertyError, ConstructionError, RegisterOfferError, StoreError, UpdateOfferError,
    ValuationError,
};
use crate::events::MarketEvent;
use crate::offer::{OfferSource, PurchaseReceipt, SaleOffer};
use crate::valuer::Valuer;

/// Buys, sells and develops properties.
#[derive(Debug)]
pub struct MarketAgent {
    ctx: MarketContext,
    valuer: Valuer,
    /// Serializes purchases and construction starts.
    lock: Mutex<()>,
}

impl MarketAgent {
    /// Create an agent over a set of collaborators.
    pub fn new(ctx: MarketContext) -> Self {
        let valuer = Valuer::from_context(&ctx);
        Self {
            ctx,
            valuer,
            lock: Mutex::new(()),
        }
    }

    /// The collaborators this agent works with.
    pub const fn context(&self) -> &MarketContext {
        &self.ctx
    }

    /// The valuer used for implicit government offers.
    pub const fn valuer(&self) -> &Valuer {
        &self.valuer
    }

    // -----------------------------------------------------------------------
    // Adverts
    // -----------------------------------------------------------------------

    /// Put the property at `address` up for sale.
    pub fn register_sale_offer(&self, address: MapPoint, net_value: Decimal) -> Result<(), RegisterOfferError> {
        if self.ctx.store.property_at(address)?.is_none() {
            return Err(RegisterOfferError::PropertyDoesNotExist(address));
        }
        let advert = SaleAdvert {
            address,
            net_price: round_money(net_value),
        };
        match self.ctx.store.create_advert(advert) {
            Ok(()) => {
                info!(%address, price = %advert.net_price, "Sale offer registered");
                Ok(())
            }
            Err(StoreError::AdvertAlreadyExists(_)) => Err(RegisterOfferError::AdvertAlreadyExists(address)),
            Err(e) => Err(e.into()),
        }
    }

    /// Change the asking price of an active advert.
    pub fn update_sale_offer(&self, address: MapPoint, net_value: Decimal) -> Result<(), UpdateOfferError> {
        let advert = SaleAdvert {
            address,
            net_price: round_money(net_value),
        };
        match self.ctx.store.update_advert(advert) {
            Ok(()) => {
                info!(%address, price = %advert.net_price, "Sale offer updated");
                Ok(())
            }
            Err(StoreError::AdvertNotFound(_)) => Err(UpdateOfferError::OfferDoesNotExist(address)),
            Err(e) => Err(e.into()),
        }
    }

    /// Withdraw the advert at `address`. Withdrawing nothing is not an error.
    pub fn cancel_sale_offer(&self, address: MapPoint) -> Result<(), StoreError> {
        if self.ctx.store.remove_advert(address)?.is_some() {
            info!(%address, "Sale offer cancelled");
        }
        Ok(())
    }

    /// Every active advert.
    pub fn adverts(&self) -> Result<Vec<SaleAdvert>, StoreError> {
        self.ctx.store.adverts()
    }

    /// Register entries of one owner.
    pub fn properties_of(&self, owner: PlayerId) -> Result<Vec<PropertyRegister>, StoreError> {
        self.ctx.store.register_entries_of(owner)
    }

    /// The offer `buyer_id` would accept when buying at `address`.
    ///
    /// Advertised properties sell at the advert price. Government property
    /// and unrecorded land sell at the estimated value. Anything else is
    /// not for sale.
    pub fn sale_offer(&self, address: MapPoint, buyer_id: PlayerId) -> Result<Option<SaleOffer>, ValuationError> {
        if !self.ctx.map.is_address_on_map(address) {
            return Ok(None);
        }
        let Some(property) = self.ctx.store.property_at(address)? else {
            let Some(kind) = self.ctx.map.tile(address).and_then(|t| t.property_kind()) else {
                return Ok(None);
            };
            return self.government_offer(address, buyer_id, kind);
        };

        let kind = property.details.kind();
        if let Some(advert) = self.ctx.store.advert(address)? {
            return Ok(Some(self.draw_up_offer(
                address,
                property.owner_id,
                buyer_id,
                kind,
                advert.net_price,
                OfferSource::Advert,
            )));
        }
        if property.owner_id != self.ctx.accounts.government {
            return Ok(None);
        }
        self.government_offer(address, buyer_id, kind)
    }

    /// Offer from the government at the estimated value.
    fn government_offer(
        &self,
        address: MapPoint,
        buyer_id: PlayerId,
        kind: PropertyKind,
    ) -> Result<Option<SaleOffer>, ValuationError> {
        let Some(estimate) = self.valuer.estimate_value(address)? else {
            return Ok(None);
        };
        Ok(Some(self.draw_up_offer(
            address,
            self.ctx.accounts.government,
            buyer_id,
            kind,
            estimate,
            OfferSource::Government,
        )))
    }

    fn draw_up_offer(
        &self,
        address: MapPoint,
        seller_id: PlayerId,
        buyer_id: PlayerId,
        kind: PropertyKind,
        net_price: Decimal,
        source: OfferSource,
    ) -> SaleOffer {
        let taxes = &self.ctx.config.taxes;
        SaleOffer {
            address,
            seller_id,
            buyer_id,
            kind,
            net_price,
            sale_invoice: Invoice::from_net(
                format!("Purchase of {} at {address}", kind.display_name()),
                net_price,
                taxes.property_purchase,
            ),
            commission_invoice: commission_invoice(
                &self.ctx.config.commission,
                taxes.services,
                kind,
                net_price,
            ),
            source,
        }
    }

    // -----------------------------------------------------------------------
    // Purchase
    // -----------------------------------------------------------------------

    /// Buy the property at `address`.
    ///
    /// With `expected_net_price` the purchase fails with
    /// [`BuyPropertyError::SaleOfferHasChanged`] unless the offer still
    /// asks exactly that price.
    pub fn buy_property(
        &self,
        address: MapPoint,
        buyer_id: PlayerId,
        expected_net_price: Option<Decimal>,
    ) -> Result<PurchaseReceipt, BuyPropertyError> {
        let (receipt, tile_changed) = {
            let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.complete_purchase(address, buyer_id, expected_net_price)?
        };

        self.notify(MarketEvent::WalletChanged {
            player: receipt.buyer_id,
        });
        self.notify(MarketEvent::WalletChanged {
            player: receipt.seller_id,
        });
        self.notify(MarketEvent::PublicAnnouncement {
            text: format!(
                "The {} at {} was sold for {}",
                receipt.kind.display_name(),
                receipt.address,
                receipt.net_price
            ),
        });
        if tile_changed {
            self.notify(MarketEvent::MapReload);
        }
        Ok(receipt)
    }

    fn complete_purchase(
        &self,
        address: MapPoint,
        buyer_id: PlayerId,
        expected_net_price: Option<Decimal>,
    ) -> Result<(PurchaseReceipt, bool), BuyPropertyError> {
        let offer = self
            .sale_offer(address, buyer_id)?
            .ok_or(BuyPropertyError::PropertyNotForSale(address))?;

        if let Some(expected) = expected_net_price.filter(|e| *e != offer.net_price) {
            return Err(BuyPropertyError::SaleOfferHasChanged {
                expected,
                actual: offer.net_price,
            });
        }
        if offer.seller_id == buyer_id {
            return Err(BuyPropertyError::TryingBuyOwnProperty(buyer_id));
        }

        let month = self.ctx.clock.current_month();
        let sale = TransactionBuilder::new(TransactionKind::PropertyPurchase, month)
            .payer(buyer_id)
            .recipient(offer.seller_id)
            .invoice(offer.sale_invoice.clone())
            .build()?;
        self.ctx.ledger.process(&sale, true)?;

        let commission = TransactionBuilder::new(TransactionKind::Commission, month)
            .payer(buyer_id)
            .recipient(self.ctx.accounts.agency)
            .invoice(offer.commission_invoice.clone())
            .build()
            .and_then(|tx| self.ctx.ledger.process(&tx, true));
        if let Err(e) = commission {
            warn!(
                %address,
                buyer = %buyer_id,
                seller = %offer.seller_id,
                error = %e,
                "Commission failed after the sale was paid; the sale stands"
            );
            return Err(e.into());
        }

        let existing = self.ctx.store.property_at(address)?;
        let previous_costs = existing.as_ref().map(Property::total_costs);
        let property = if let Some(mut property) = existing {
            property.owner_id = buyer_id;
            property.purchase_net_value = offer.net_price;
            property.investments_net_value = Decimal::ZERO;
            self.ctx.store.update_property(property.clone())?;
            property
        } else {
            let property = self.unrecorded_property(address, buyer_id, offer.net_price);
            self.ctx.store.create_property(property.clone())?;
            property
        };
        self.ctx.store.save_register_entry(property.register_entry())?;

        let tile_type = property.tile_type();
        let tile_changed = self.ctx.map.tile(address).map(|t| t.tile_type) != Some(tile_type);
        if tile_changed {
            self.ctx.editor.set_tile(address, tile_type)?;
        }
        self.ctx.store.remove_advert(address)?;

        let income_tax_refund = if self.ctx.accounts.is_system(offer.seller_id) {
            None
        } else {
            let costs = previous_costs.unwrap_or(Decimal::ZERO);
            match self.ctx.ledger.refund_income_tax(&sale, costs) {
                Ok(refund) => refund,
                Err(e) => {
                    warn!(%address, seller = %offer.seller_id, error = %e, "Income tax refund failed");
                    None
                }
            }
        };

        info!(
            %address,
            property = %property.id,
            buyer = %buyer_id,
            seller = %offer.seller_id,
            price = %offer.net_price,
            commission = %offer.commission_invoice.net_value(),
            "Property sold"
        );

        let receipt = PurchaseReceipt {
            property_id: property.id,
            address,
            kind: offer.kind,
            seller_id: offer.seller_id,
            buyer_id,
            net_price: offer.net_price,
            commission: offer.commission_invoice.net_value(),
            income_tax_refund,
        };
        Ok((receipt, tile_changed))
    }

    /// A new property record for an address sold straight off the map.
    fn unrecorded_property(&self, address: MapPoint, owner: PlayerId, price: Decimal) -> Property {
        let default_storeys = self.ctx.config.construction.default_storeys;
        let details = self
            .ctx
            .map
            .tile(address)
            .map_or(PropertyDetails::Land, |t| details_for_tile(t.tile_type, default_storeys));
        Property::land(owner, address, price).converted(details, ConstructionState::Ready)
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Start building `target` on ready land owned by `owner_id`.
    ///
    /// The owner pays the quoted invoice to the government, the quoted net
    /// cost is added to the property's investments and the property is
    /// converted in place, keeping its id.
    pub fn start_construction(
        &self,
        address: MapPoint,
        owner_id: PlayerId,
        target: PropertyDetails,
    ) -> Result<Property, ConstructionError> {
        let property = {
            let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.begin_works(address, owner_id, target)?
        };
        self.notify(MarketEvent::WalletChanged { player: owner_id });
        self.notify(MarketEvent::MapReload);
        Ok(property)
    }

    fn begin_works(
        &self,
        address: MapPoint,
        owner_id: PlayerId,
        target: PropertyDetails,
    ) -> Result<Property, ConstructionError> {
        let kind = target.kind();
        let storeys = match target {
            PropertyDetails::ResidentialBuilding { storeys: 0 } | PropertyDetails::Land => {
                return Err(ConstructionError::InvalidTarget(kind));
            }
            PropertyDetails::ResidentialBuilding { storeys } => Some(storeys),
            PropertyDetails::Road | PropertyDetails::Parking => None,
        };

        let property = self
            .ctx
            .store
            .property_at(address)?
            .ok_or(ConstructionError::PropertyDoesNotExist(address))?;
        if property.owner_id != owner_id {
            return Err(ConstructionError::NotOwner(owner_id));
        }
        if property.details != PropertyDetails::Land || property.construction.is_under_construction() {
            return Err(ConstructionError::NotBuildable(address));
        }

        let quote = self.ctx.quoter.quote(kind, storeys)?;
        let month = self.ctx.clock.current_month();
        let payment = TransactionBuilder::new(TransactionKind::Construction, month)
            .payer(owner_id)
            .recipient(self.ctx.accounts.government)
            .invoice(quote.invoice.clone())
            .build()?;
        self.ctx.ledger.process(&payment, true)?;

        let construction = ConstructionState::UnderConstruction {
            started_month: month,
            finish_month: month.saturating_add(quote.duration_months),
        };
        let mut built = property.converted(target, construction);
        built.investments_net_value = built
            .investments_net_value
            .saturating_add(quote.invoice.net_value());

        self.ctx.store.update_property(built.clone())?;
        self.ctx.store.save_register_entry(built.register_entry())?;
        self.ctx.editor.set_tile(address, built.tile_type())?;
        if kind == PropertyKind::Parking && self.ctx.store.parking_state(address)?.is_none() {
            self.ctx.store.save_parking_state(ParkingState::new(address))?;
        }

        info!(
            %address,
            property = %built.id,
            owner = %owner_id,
            ?kind,
            cost = %quote.invoice.net_value(),
            finish_month = month.saturating_add(quote.duration_months),
            "Construction started"
        );
        Ok(built)
    }

    /// Finish every construction due by the current month.
    ///
    /// Returns the addresses that became ready.
    pub fn finish_due_constructions(&self) -> Result<Vec<MapPoint>, ConstructionError> {
        let finished = {
            let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.complete_due_works()?
        };
        if !finished.is_empty() {
            self.notify(MarketEvent::MapReload);
        }
        Ok(finished)
    }

    fn complete_due_works(&self) -> Result<Vec<MapPoint>, ConstructionError> {
        let month = self.ctx.clock.current_month();
        let mut finished = Vec::new();
        for mut property in self.ctx.store.properties()? {
            let ConstructionState::UnderConstruction { finish_month, .. } = property.construction else {
                continue;
            };
            if finish_month > month {
                continue;
            }
            property.construction = ConstructionState::Ready;
            self.ctx.store.update_property(property.clone())?;
            self.ctx.store.save_register_entry(property.register_entry())?;
            self.ctx.editor.set_tile(property.address, property.tile_type())?;
            info!(address = %property.address, property = %property.id, "Construction finished");
            finished.push(property.address);
        }
        Ok(finished)
    }

    fn notify(&self, event: MarketEvent) {
        self.ctx.notifier.notify(event);
    }
}

/// Property details matching a tile that has no property record yet.
const fn details_for_tile(tile_type: TileType, default_storeys: u8) -> PropertyDetails {
    match tile_type {
        TileType::Street => PropertyDetails::Road,
        TileType::Parking => PropertyDetails::Parking,
        TileType::ResidentialBuilding { storeys } => PropertyDetails::ResidentialBuilding { storeys },
        TileType::Construction { target } => match target {
            PropertyKind::Land => PropertyDetails::Land,
            PropertyKind::Road => PropertyDetails::Road,
            PropertyKind::Parking => PropertyDetails::Parking,
            PropertyKind::ResidentialBuilding => PropertyDetails::ResidentialBuilding {
                storeys: default_storeys,
            },
        },
        TileType::Vacant
        | TileType::Land
        | TileType::Office
        | TileType::CivicBuilding
        | TileType::School
        | TileType::Hospital
        | TileType::FootballPitch
        | TileType::Warehouse
        | TileType::Antenna => PropertyDetails::Land,
    }
}
