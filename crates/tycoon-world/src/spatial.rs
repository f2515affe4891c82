//! Spatial query seams consumed by the market.
//!
//! [`SpatialQuery`] is the read side used by valuation and demand
//! allocation; [`MapEditor`] is the write side used after ownership or
//! construction changes. [`SharedMap`] implements both over a
//! [`GameMap`] behind a read-write lock.

use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;

use tycoon_types::{MapPoint, TileType};

use crate::error::WorldError;
use crate::grid::{GameMap, Tile};

/// Read-only spatial queries over the city map.
pub trait SpatialQuery: Send + Sync {
    /// Tile at an address, `None` off the map.
    fn tile(&self, address: MapPoint) -> Option<Tile>;

    /// Whether the address lies inside the map.
    fn is_address_on_map(&self, address: MapPoint) -> bool;

    /// Addresses at Chebyshev distance exactly `radius`, clipped to the map.
    fn neighbour_addresses(&self, address: MapPoint, radius: u32) -> Vec<MapPoint>;

    /// Share of the map that is not virgin land.
    fn occupied_map_ratio(&self) -> Decimal;

    /// Tiles on the ring at `radius` around `address`.
    fn ring_tiles(&self, address: MapPoint, radius: u32) -> Vec<Tile> {
        self.neighbour_addresses(address, radius)
            .into_iter()
            .filter_map(|p| self.tile(p))
            .collect()
    }

    /// Number of tiles on the ring matching `predicate`.
    fn count_in_ring(&self, address: MapPoint, radius: u32, predicate: fn(TileType) -> bool) -> usize {
        self.ring_tiles(address, radius)
            .into_iter()
            .filter(|t| predicate(t.tile_type))
            .count()
    }
}

/// Write access to the city map.
pub trait MapEditor: Send + Sync {
    /// Replace the tile at an address.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] when the address is off the map or the map is
    /// unavailable.
    fn set_tile(&self, address: MapPoint, tile_type: TileType) -> Result<(), WorldError>;
}

impl SpatialQuery for GameMap {
    fn tile(&self, address: MapPoint) -> Option<Tile> {
        Self::tile(self, address)
    }

    fn is_address_on_map(&self, address: MapPoint) -> bool {
        Self::is_address_on_map(self, address)
    }

    fn neighbour_addresses(&self, address: MapPoint, radius: u32) -> Vec<MapPoint> {
        Self::neighbour_addresses(self, address, radius)
    }

    fn occupied_map_ratio(&self) -> Decimal {
        Self::occupied_map_ratio(self)
    }
}

/// A [`GameMap`] shared between readers and a writer.
#[derive(Debug)]
pub struct SharedMap {
    inner: RwLock<GameMap>,
}

impl SharedMap {
    /// Wrap a map.
    pub const fn new(map: GameMap) -> Self {
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl SpatialQuery for SharedMap {
    fn tile(&self, address: MapPoint) -> Option<Tile> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tile(address)
    }

    fn is_address_on_map(&self, address: MapPoint) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_address_on_map(address)
    }

    fn neighbour_addresses(&self, address: MapPoint, radius: u32) -> Vec<MapPoint> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .neighbour_addresses(address, radius)
    }

    fn occupied_map_ratio(&self) -> Decimal {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .occupied_map_ratio()
    }
}

impl MapEditor for SharedMap {
    fn set_tile(&self, address: MapPoint, tile_type: TileType) -> Result<(), WorldError> {
        let mut map = self.inner.write().map_err(|_poison| WorldError::Poisoned)?;
        map.set_tile(address, tile_type)?;
        tracing::debug!(%address, ?tile_type, "Tile updated");
        Ok(())
    }
}
