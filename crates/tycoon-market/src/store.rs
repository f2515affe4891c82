//! Persistence seam for properties, adverts, parking states and the
//! ownership register.
//!
//! [`InMemoryStore`] keeps everything in one set of tables behind a single
//! read-write lock, so each call sees a consistent snapshot.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tycoon_types::{
    MapPoint, ParkingState, PlayerId, Property, PropertyId, PropertyRegister, SaleAdvert,
};

use crate::error::StoreError;

/// Storage used by the market.
///
/// Implementations enforce one property per address and at most one advert
/// per address.
pub trait MarketStore: Send + Sync {
    /// Property recorded at an address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be read.
    fn property_at(&self, address: MapPoint) -> Result<Option<Property>, StoreError>;

    /// Every recorded property.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be read.
    fn properties(&self) -> Result<Vec<Property>, StoreError>;

    /// Record a new property.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateProperty`] when the address is taken.
    fn create_property(&self, property: Property) -> Result<(), StoreError>;

    /// Replace an existing property, matched by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PropertyNotFound`] when the id is unknown.
    fn update_property(&self, property: Property) -> Result<(), StoreError>;

    /// Advert at an address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be read.
    fn advert(&self, address: MapPoint) -> Result<Option<SaleAdvert>, StoreError>;

    /// Every active advert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be read.
    fn adverts(&self) -> Result<Vec<SaleAdvert>, StoreError>;

    /// Publish a new advert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AdvertAlreadyExists`] when one is active.
    fn create_advert(&self, advert: SaleAdvert) -> Result<(), StoreError>;

    /// Change the price of an active advert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AdvertNotFound`] when there is none.
    fn update_advert(&self, advert: SaleAdvert) -> Result<(), StoreError>;

    /// Remove the advert at an address, returning it if there was one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be written.
    fn remove_advert(&self, address: MapPoint) -> Result<Option<SaleAdvert>, StoreError>;

    /// Business state of the parking lot at an address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be read.
    fn parking_state(&self, address: MapPoint) -> Result<Option<ParkingState>, StoreError>;

    /// Insert or replace a parking state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be written.
    fn save_parking_state(&self, state: ParkingState) -> Result<(), StoreError>;

    /// Register entry for a property.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be read.
    fn register_entry(&self, id: PropertyId) -> Result<Option<PropertyRegister>, StoreError>;

    /// Register entries of one owner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be read.
    fn register_entries_of(&self, owner: PlayerId) -> Result<Vec<PropertyRegister>, StoreError>;

    /// Insert or replace a register entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be written.
    fn save_register_entry(&self, entry: PropertyRegister) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    properties: BTreeMap<PropertyId, Property>,
    by_address: BTreeMap<MapPoint, PropertyId>,
    adverts: BTreeMap<MapPoint, SaleAdvert>,
    parkings: BTreeMap<MapPoint, ParkingState>,
    register: BTreeMap<PropertyId, PropertyRegister>,
}

/// In-memory [`MarketStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        f(&tables)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut tables)
    }
}

impl MarketStore for InMemoryStore {
    fn property_at(&self, address: MapPoint) -> Result<Option<Property>, StoreError> {
        Ok(self.read(|t| {
            t.by_address
                .get(&address)
                .and_then(|id| t.properties.get(id))
                .cloned()
        }))
    }

    fn properties(&self) -> Result<Vec<Property>, StoreError> {
        Ok(self.read(|t| t.properties.values().cloned().collect()))
    }

    fn create_property(&self, property: Property) -> Result<(), StoreError> {
        self.write(|t| {
            if t.by_address.contains_key(&property.address) {
                return Err(StoreError::DuplicateProperty(property.address));
            }
            t.by_address.insert(property.address, property.id);
            t.properties.insert(property.id, property);
            Ok(())
        })
    }

    fn update_property(&self, property: Property) -> Result<(), StoreError> {
        self.write(|t| {
            let Some(existing) = t.properties.get(&property.id) else {
                return Err(StoreError::PropertyNotFound(property.id));
            };
            if existing.address != property.address {
                if t.by_address.contains_key(&property.address) {
                    return Err(StoreError::DuplicateProperty(property.address));
                }
                t.by_address.remove(&existing.address);
                t.by_address.insert(property.address, property.id);
            }
            t.properties.insert(property.id, property);
            Ok(())
        })
    }

    fn advert(&self, address: MapPoint) -> Result<Option<SaleAdvert>, StoreError> {
        Ok(self.read(|t| t.adverts.get(&address).copied()))
    }

    fn adverts(&self) -> Result<Vec<SaleAdvert>, StoreError> {
        Ok(self.read(|t| t.adverts.values().copied().collect()))
    }

    fn create_advert(&self, advert: SaleAdvert) -> Result<(), StoreError> {
        self.write(|t| {
            if t.adverts.contains_key(&advert.address) {
                return Err(StoreError::AdvertAlreadyExists(advert.address));
            }
            t.adverts.insert(advert.address, advert);
            Ok(())
        })
    }

    fn update_advert(&self, advert: SaleAdvert) -> Result<(), StoreError> {
        let address = advert.address;
        self.write(|t| {
            t.adverts
                .get_mut(&address)
                .map_or(Err(StoreError::AdvertNotFound(address)), |slot| {
                    *slot = advert;
                    Ok(())
                })
        })
    }

    fn remove_advert(&self, address: MapPoint) -> Result<Option<SaleAdvert>, StoreError> {
        Ok(self.write(|t| t.adverts.remove(&address)))
    }

    fn parking_state(&self, address: MapPoint) -> Result<Option<ParkingState>, StoreError> {
        Ok(self.read(|t| t.parkings.get(&address).copied()))
    }

    fn save_parking_state(&self, state: ParkingState) -> Result<(), StoreError> {
        self.write(|t| t.parkings.insert(state.address, state));
        Ok(())
    }

    fn register_entry(&self, id: PropertyId) -> Result<Option<PropertyRegister>, StoreError> {
        Ok(self.read(|t| t.register.get(&id).copied()))
    }

    fn register_entries_of(&self, owner: PlayerId) -> Result<Vec<PropertyRegister>, StoreError> {
        Ok(self.read(|t| {
            t.register
                .values()
                .filter(|e| e.owner_id == owner)
                .copied()
                .collect()
        }))
    }

    fn save_register_entry(&self, entry: PropertyRegister) -> Result<(), StoreError> {
        self.write(|t| t.register.insert(entry.property_id, entry));
        Ok(())
    }
}
