//! Parking demand allocation.
//!
//! Buildings, schools, hospitals and other destinations within two tiles of
//! a parking lot bring cars. When several parking lots reach the same
//! destination its cars are split between them in proportion to each lot's
//! trust level:
//!
//! ```text
//! share = car_count * my_trust / (my_trust + sum(competitor_trust))
//! ```
//!
//! The shares of every lot reaching a tile add up to the tile's car count.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use tycoon_types::{MapPoint, ParkingState, TileType};
use tycoon_world::SpatialQuery;

use crate::config::DemandConfig;
use crate::context::MarketContext;
use crate::error::StoreError;
use crate::store::MarketStore;

/// Rings around a parking lot its customers come from.
const DEMAND_RADIUS: u32 = 2;

/// Rings searched for competing parking lots.
const COMPETITION_RADIUS: u32 = 4;

/// How one demand tile was shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileAllocation {
    /// The demand tile.
    pub address: MapPoint,
    /// Cars the tile brings.
    pub car_count: Decimal,
    /// Cars allocated to the evaluated lot.
    pub share: Decimal,
    /// Competing lots that also reach the tile.
    pub competitors: usize,
}

/// Demand breakdown for one parking lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemandReport {
    /// The evaluated lot.
    pub address: MapPoint,
    /// Its trust level.
    pub trust_level: Decimal,
    /// Business state with the service tiers, `None` for a lot nobody runs.
    pub parking: Option<ParkingState>,
    /// Total allocated cars.
    pub total: Decimal,
    /// Per-tile allocation.
    pub tiles: Vec<TileAllocation>,
    /// Parking lots within reach.
    pub competitors: Vec<MapPoint>,
}

/// Splits parking demand between competing lots.
#[derive(Clone)]
pub struct DemandAllocator {
    map: Arc<dyn SpatialQuery>,
    store: Arc<dyn MarketStore>,
    config: DemandConfig,
}

impl core::fmt::Debug for DemandAllocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DemandAllocator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DemandAllocator {
    /// Create an allocator.
    pub const fn new(map: Arc<dyn SpatialQuery>, store: Arc<dyn MarketStore>, config: DemandConfig) -> Self {
        Self { map, store, config }
    }

    /// Create an allocator over the context's map and store.
    pub fn from_context(ctx: &MarketContext) -> Self {
        Self::new(ctx.map.clone(), ctx.store.clone(), ctx.config.demand.clone())
    }

    /// Cars a tile brings, `None` for tiles that generate no demand.
    pub const fn car_count(&self, tile_type: TileType) -> Option<Decimal> {
        match tile_type {
            TileType::ResidentialBuilding { .. } | TileType::Office => Some(self.config.building),
            TileType::CivicBuilding => Some(self.config.civic_building),
            TileType::School => Some(self.config.school),
            TileType::Hospital => Some(self.config.hospital),
            TileType::FootballPitch => Some(self.config.football_pitch),
            TileType::Warehouse => Some(self.config.warehouse),
            TileType::Vacant
            | TileType::Land
            | TileType::Street
            | TileType::Parking
            | TileType::Antenna
            | TileType::Construction { .. } => None,
        }
    }

    /// Demand tiles within reach of an address with their car counts.
    pub fn demand_tiles(&self, address: MapPoint) -> BTreeMap<MapPoint, Decimal> {
        (1..=DEMAND_RADIUS)
            .flat_map(|radius| self.map.ring_tiles(address, radius))
            .filter_map(|tile| {
                self.car_count(tile.tile_type)
                    .map(|cars| (tile.address, cars))
            })
            .collect()
    }

    /// Parking lots in rings 1 to 4 around an address.
    pub fn parkings_around_address(&self, address: MapPoint) -> Vec<MapPoint> {
        (1..=COMPETITION_RADIUS)
            .flat_map(|radius| self.map.ring_tiles(address, radius))
            .filter(|tile| tile.tile_type.is_parking())
            .map(|tile| tile.address)
            .collect()
    }

    /// Cars a parking lot at `address` attracts after competition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when parking states cannot be read.
    pub fn calculate_demand(&self, address: MapPoint) -> Result<Decimal, StoreError> {
        Ok(self.demand_report(address)?.total)
    }

    /// Per-tile breakdown of [`Self::calculate_demand`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when parking states cannot be read.
    pub fn demand_report(&self, address: MapPoint) -> Result<DemandReport, StoreError> {
        let parking = self.parking_at(address)?;
        let trust_level = parking.map_or(Decimal::ONE, |s| s.trust_level());
        let my_tiles = self.demand_tiles(address);
        let competitors = self.parkings_around_address(address);

        let mut contested: BTreeMap<MapPoint, Vec<Decimal>> = BTreeMap::new();
        for competitor in &competitors {
            let trust = self.trust_at(*competitor)?;
            for tile in self.demand_tiles(*competitor).into_keys() {
                if my_tiles.contains_key(&tile) {
                    contested.entry(tile).or_default().push(trust);
                }
            }
        }

        let mut total = Decimal::ZERO;
        let mut tiles = Vec::with_capacity(my_tiles.len());
        for (tile, car_count) in my_tiles {
            let rivals = contested.get(&tile).map_or(&[][..], Vec::as_slice);
            let share = Self::allocate_tile(car_count, trust_level, rivals);
            total = total.saturating_add(share);
            tiles.push(TileAllocation {
                address: tile,
                car_count,
                share,
                competitors: rivals.len(),
            });
        }

        Ok(DemandReport {
            address,
            trust_level,
            parking,
            total,
            tiles,
            competitors,
        })
    }

    /// Share of one tile's cars for a lot with `my_trust` against competitors.
    ///
    /// An uncontested tile is taken whole. When every party has zero trust
    /// the cars are split evenly.
    pub fn allocate_tile(car_count: Decimal, my_trust: Decimal, competitor_trusts: &[Decimal]) -> Decimal {
        if competitor_trusts.is_empty() {
            return car_count;
        }
        let rivals = competitor_trusts
            .iter()
            .fold(Decimal::ZERO, |acc, t| acc.saturating_add(*t));
        let trust_sum = my_trust.saturating_add(rivals);
        if trust_sum.is_zero() {
            let parties = Decimal::from(competitor_trusts.len()).saturating_add(Decimal::ONE);
            return car_count.checked_div(parties).unwrap_or(Decimal::ZERO);
        }
        car_count
            .saturating_mul(my_trust)
            .checked_div(trust_sum)
            .unwrap_or(Decimal::ZERO)
    }

    fn parking_at(&self, address: MapPoint) -> Result<Option<ParkingState>, StoreError> {
        self.store.parking_state(address)
    }

    fn trust_at(&self, address: MapPoint) -> Result<Decimal, StoreError> {
        Ok(self
            .parking_at(address)?
            .map_or(Decimal::ONE, |s| s.trust_level()))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tycoon_types::ParkingState;
    use tycoon_world::{GameMap, MapEditor, SharedMap};

    use super::*;
    use crate::store::InMemoryStore;

    struct Fixture {
        map: Arc<SharedMap>,
        store: Arc<InMemoryStore>,
        allocator: DemandAllocator,
    }

    fn fixture() -> Option<Fixture> {
        let map = Arc::new(SharedMap::new(GameMap::new(20, 20).ok()?));
        let store = Arc::new(InMemoryStore::new());
        let config = DemandConfig {
            building: dec!(10),
            ..DemandConfig::default()
        };
        let allocator = DemandAllocator::new(map.clone(), store.clone(), config);
        Some(Fixture {
            map,
            store,
            allocator,
        })
    }

    fn put(f: &Fixture, x: i32, y: i32, tile: TileType) {
        assert!(f.map.set_tile(MapPoint::new(x, y), tile).is_ok());
    }

    #[test]
    fn uncontested_tile_is_taken_whole() {
        assert_eq!(DemandAllocator::allocate_tile(dec!(7), dec!(0.3), &[]), dec!(7));
    }

    #[test]
    fn equal_trust_splits_evenly() {
        let share = DemandAllocator::allocate_tile(dec!(10), dec!(0.6), &[dec!(0.6)]);
        assert_eq!(share, dec!(5));
    }

    #[test]
    fn shares_add_up_to_car_count() {
        let trusts = [dec!(0.5), dec!(0.3), dec!(0.2)];
        let total: Decimal = trusts
            .iter()
            .enumerate()
            .map(|(i, mine)| {
                let rivals: Vec<Decimal> = trusts
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, t)| *t)
                    .collect();
                DemandAllocator::allocate_tile(dec!(10), *mine, &rivals)
            })
            .sum();
        assert_eq!(total, dec!(10));
    }

    #[test]
    fn uneven_three_way_split_conserves_cars() {
        let trusts = [dec!(0.7), dec!(0.1), dec!(0.45)];
        let total: Decimal = (0..trusts.len())
            .map(|i| {
                let rivals: Vec<Decimal> = trusts
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, t)| *t)
                    .collect();
                let mine = trusts.get(i).copied().unwrap_or_default();
                DemandAllocator::allocate_tile(dec!(13), mine, &rivals)
            })
            .sum();
        assert_eq!(total.round_dp(10), dec!(13));
    }

    #[test]
    fn zero_trust_everywhere_splits_evenly() {
        let share = DemandAllocator::allocate_tile(dec!(9), Decimal::ZERO, &[Decimal::ZERO, Decimal::ZERO]);
        assert_eq!(share, dec!(3));
    }

    #[test]
    fn demand_counts_rings_one_and_two_only() {
        let Some(f) = fixture() else {
            return;
        };
        put(&f, 11, 10, TileType::ResidentialBuilding { storeys: 3 });
        put(&f, 12, 12, TileType::Office);
        put(&f, 13, 10, TileType::Hospital);
        put(&f, 9, 9, TileType::Street);
        let lot = MapPoint::new(10, 10);
        assert_eq!(f.allocator.calculate_demand(lot), Ok(dec!(20)));
    }

    #[test]
    fn competitor_takes_its_share() {
        let Some(f) = fixture() else {
            return;
        };
        let mine = MapPoint::new(10, 10);
        let theirs = MapPoint::new(12, 10);
        put(&f, 10, 10, TileType::Parking);
        put(&f, 12, 10, TileType::Parking);
        put(&f, 11, 10, TileType::ResidentialBuilding { storeys: 2 });
        put(&f, 8, 10, TileType::ResidentialBuilding { storeys: 2 });

        let mut state = ParkingState::new(theirs);
        state.set_trust_level(dec!(0.25));
        assert!(f.store.save_parking_state(state).is_ok());

        assert_eq!(f.allocator.parkings_around_address(mine), vec![theirs]);
        let report = f.allocator.demand_report(mine);
        assert!(report.is_ok());
        if let Ok(report) = report {
            // (11,10) contested 1.0 vs 0.25 -> 8; (8,10) out of their reach -> 10.
            assert_eq!(report.total, dec!(18));
            assert_eq!(report.tiles.len(), 2);
            assert_eq!(report.tiles.iter().filter(|t| t.competitors == 1).count(), 1);
        }
        assert_eq!(f.allocator.calculate_demand(theirs), Ok(dec!(2)));
    }

    #[test]
    fn report_carries_the_lot_business_state() {
        let Some(f) = fixture() else {
            return;
        };
        let run = MapPoint::new(10, 10);
        let idle = MapPoint::new(3, 3);
        put(&f, 10, 10, TileType::Parking);
        put(&f, 3, 3, TileType::Parking);

        let mut state = ParkingState::new(run);
        state.set_trust_level(dec!(0.6));
        state.security_tier = 2;
        state.advertising_tier = 1;
        assert!(f.store.save_parking_state(state).is_ok());

        let report = f.allocator.demand_report(run).ok();
        assert_eq!(report.as_ref().map(|r| r.trust_level), Some(dec!(0.6)));
        assert_eq!(report.and_then(|r| r.parking), Some(state));

        let report = f.allocator.demand_report(idle).ok();
        assert_eq!(report.as_ref().map(|r| r.trust_level), Some(Decimal::ONE));
        assert_eq!(report.and_then(|r| r.parking), None);
    }

    #[test]
    fn competitors_are_found_up_to_ring_four() {
        let Some(f) = fixture() else {
            return;
        };
        put(&f, 14, 10, TileType::Parking);
        put(&f, 15, 10, TileType::Parking);
        let found = f.allocator.parkings_around_address(MapPoint::new(10, 10));
        assert_eq!(found, vec![MapPoint::new(14, 10)]);
    }
}
