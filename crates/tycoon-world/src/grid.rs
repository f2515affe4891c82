//! The city grid: a rectangle of tiles addressed by [`MapPoint`].
//!
//! Only non-vacant tiles are stored; every on-map address without an entry
//! is virgin land ([`TileType::Vacant`]).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tycoon_types::{MapPoint, PropertyKind, TileType};

use crate::error::WorldError;

/// A tile as returned by map queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Where the tile is.
    pub address: MapPoint,
    /// What the tile renders.
    pub tile_type: TileType,
}

impl Tile {
    /// The ownable property kind of this tile, if any.
    pub const fn property_kind(&self) -> Option<PropertyKind> {
        self.tile_type.property_kind()
    }
}

/// A rectangular city map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    width: i32,
    height: i32,
    /// Non-vacant tiles.
    tiles: BTreeMap<MapPoint, TileType>,
}

impl GameMap {
    /// Create an all-vacant map.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidSize`] for zero or oversized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        let invalid = WorldError::InvalidSize { width, height };
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(invalid);
        };
        if w == 0 || h == 0 {
            return Err(invalid);
        }
        Ok(Self {
            width: w,
            height: h,
            tiles: BTreeMap::new(),
        })
    }

    /// Map width in tiles.
    pub fn width(&self) -> u32 {
        u32::try_from(self.width).unwrap_or(0)
    }

    /// Map height in tiles.
    pub fn height(&self) -> u32 {
        u32::try_from(self.height).unwrap_or(0)
    }

    /// Whether the address lies inside the map.
    pub const fn is_address_on_map(&self, address: MapPoint) -> bool {
        address.x >= 0 && address.y >= 0 && address.x < self.width && address.y < self.height
    }

    /// Tile at an address, `None` off the map.
    pub fn tile(&self, address: MapPoint) -> Option<Tile> {
        if !self.is_address_on_map(address) {
            return None;
        }
        let tile_type = self
            .tiles
            .get(&address)
            .copied()
            .unwrap_or(TileType::Vacant);
        Some(Tile { address, tile_type })
    }

    /// Replace the tile at an address.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OffMap`] when the address is outside the map.
    pub fn set_tile(&mut self, address: MapPoint, tile_type: TileType) -> Result<(), WorldError> {
        if !self.is_address_on_map(address) {
            return Err(WorldError::OffMap(address));
        }
        if tile_type == TileType::Vacant {
            self.tiles.remove(&address);
        } else {
            self.tiles.insert(address, tile_type);
        }
        Ok(())
    }

    /// Addresses at Chebyshev distance exactly `radius`, clipped to the map.
    ///
    /// An interior ring of radius `r` has `8r` points. Radius 0 yields none.
    pub fn neighbour_addresses(&self, address: MapPoint, radius: u32) -> Vec<MapPoint> {
        let Ok(r) = i32::try_from(radius) else {
            return Vec::new();
        };
        if r == 0 {
            return Vec::new();
        }

        let low = r.saturating_neg();
        let mut ring = Vec::new();
        for dx in low..=r {
            ring.push(address.offset(dx, low));
            ring.push(address.offset(dx, r));
        }
        for dy in low.saturating_add(1)..r {
            ring.push(address.offset(low, dy));
            ring.push(address.offset(r, dy));
        }
        ring.into_iter()
            .flatten()
            .filter(|p| self.is_address_on_map(*p))
            .collect()
    }

    /// Share of map tiles that are not virgin land, in `[0, 1]`.
    pub fn occupied_map_ratio(&self) -> Decimal {
        let total = i64::from(self.width).saturating_mul(i64::from(self.height));
        let occupied = self
            .tiles
            .values()
            .filter(|t| t.is_occupied())
            .count();
        let occupied = i64::try_from(occupied).unwrap_or(i64::MAX);
        Decimal::from(occupied)
            .checked_div(Decimal::from(total))
            .unwrap_or(Decimal::ZERO)
    }

    /// Every non-vacant tile.
    pub fn occupied_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles.iter().map(|(address, tile_type)| Tile {
            address: *address,
            tile_type: *tile_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn map() -> GameMap {
        GameMap::new(20, 20).unwrap_or_else(|_| GameMap {
            width: 1,
            height: 1,
            tiles: BTreeMap::new(),
        })
    }

    #[test]
    fn zero_size_rejected() {
        assert_eq!(
            GameMap::new(0, 5),
            Err(WorldError::InvalidSize {
                width: 0,
                height: 5
            })
        );
    }

    #[test]
    #[allow(clippy::arithmetic_side_effects)]
    fn interior_rings_have_eight_r_points() {
        let map = map();
        let center = MapPoint::new(10, 10);
        for radius in 1..=4 {
            let ring = map.neighbour_addresses(center, radius);
            assert_eq!(ring.len(), 8 * radius as usize, "radius {radius}");
            assert!(ring.iter().all(|p| center.chebyshev_distance(*p) == radius));
        }
    }

    #[test]
    fn rings_are_disjoint_and_unique() {
        let map = map();
        let center = MapPoint::new(10, 10);
        let mut seen = std::collections::BTreeSet::new();
        for radius in 1..=4 {
            for p in map.neighbour_addresses(center, radius) {
                assert!(seen.insert(p), "{p} returned twice");
            }
        }
        assert_eq!(seen.len(), 8 + 16 + 24 + 32);
    }

    #[test]
    fn corner_ring_is_clipped() {
        let map = map();
        let corner = MapPoint::new(0, 0);
        assert_eq!(map.neighbour_addresses(corner, 1).len(), 3);
        assert_eq!(map.neighbour_addresses(corner, 2).len(), 5);
        let edge = MapPoint::new(0, 10);
        assert_eq!(map.neighbour_addresses(edge, 1).len(), 5);
    }

    #[test]
    fn radius_zero_is_empty() {
        assert!(map().neighbour_addresses(MapPoint::new(3, 3), 0).is_empty());
    }

    #[test]
    fn unset_tiles_are_vacant() {
        let map = map();
        let tile = map.tile(MapPoint::new(4, 4));
        assert_eq!(tile.map(|t| t.tile_type), Some(TileType::Vacant));
        assert_eq!(map.tile(MapPoint::new(20, 0)), None);
    }

    #[test]
    fn set_tile_off_map_rejected() {
        let mut map = map();
        let off = MapPoint::new(-1, 3);
        assert_eq!(map.set_tile(off, TileType::Street), Err(WorldError::OffMap(off)));
    }

    #[test]
    fn occupied_ratio_counts_non_vacant() {
        let mut map = map();
        assert_eq!(map.occupied_map_ratio(), Decimal::ZERO);
        for x in 0..4 {
            assert!(map.set_tile(MapPoint::new(x, 0), TileType::Street).is_ok());
        }
        // 4 of 400 tiles.
        assert_eq!(map.occupied_map_ratio(), dec!(0.01));
        assert!(map.set_tile(MapPoint::new(0, 0), TileType::Vacant).is_ok());
        assert_eq!(map.occupied_tiles().count(), 3);
    }
}
