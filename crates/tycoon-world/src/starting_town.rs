//! Default starting town used to seed new games.
//!
//! A 24x24 grid with a street every sixth row and column, a residential
//! block in each quarter, civic buildings in the centre, an antenna on the
//! east side and two parking lots competing for the same customers.

use tycoon_types::{MapPoint, TileType};

use crate::error::WorldError;
use crate::grid::GameMap;

/// Width and height of the starting town.
pub const STARTING_TOWN_SIZE: u32 = 24;

/// Spacing between parallel streets.
const STREET_SPACING: usize = 6;

/// Addresses of notable tiles in the starting town.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartingTownAddresses {
    /// Parking lot west of the centre.
    pub west_parking: MapPoint,
    /// Parking lot east of the centre.
    pub east_parking: MapPoint,
    /// Vacant plot next to a street, good for building.
    pub corner_plot: MapPoint,
    /// Vacant plot three tiles from the nearest street.
    pub remote_plot: MapPoint,
    /// The town hall.
    pub town_hall: MapPoint,
}

/// Build the starting town.
///
/// # Errors
///
/// Returns [`WorldError`] if any seeded tile falls off the map.
pub fn create_starting_town() -> Result<(GameMap, StartingTownAddresses), WorldError> {
    let mut map = GameMap::new(STARTING_TOWN_SIZE, STARTING_TOWN_SIZE)?;
    let size = i32::try_from(STARTING_TOWN_SIZE).map_err(|_overflow| WorldError::InvalidSize {
        width: STARTING_TOWN_SIZE,
        height: STARTING_TOWN_SIZE,
    })?;

    // Street grid.
    for line in (0..size).step_by(STREET_SPACING) {
        for i in 0..size {
            map.set_tile(MapPoint::new(line, i), TileType::Street)?;
            map.set_tile(MapPoint::new(i, line), TileType::Street)?;
        }
    }

    // Residential blocks hugging the streets.
    for (x, y, storeys) in [(7, 1, 4), (8, 1, 6), (1, 7, 3), (13, 7, 8), (14, 13, 4), (19, 19, 10)] {
        map.set_tile(MapPoint::new(x, y), TileType::ResidentialBuilding { storeys })?;
    }
    map.set_tile(MapPoint::new(9, 1), TileType::Office)?;

    let town_hall = MapPoint::new(11, 11);
    map.set_tile(town_hall, TileType::CivicBuilding)?;
    map.set_tile(MapPoint::new(13, 11), TileType::School)?;
    map.set_tile(MapPoint::new(10, 13), TileType::Hospital)?;
    map.set_tile(MapPoint::new(16, 16), TileType::FootballPitch)?;
    map.set_tile(MapPoint::new(3, 20), TileType::Warehouse)?;
    map.set_tile(MapPoint::new(22, 9), TileType::Antenna)?;

    let west_parking = MapPoint::new(10, 10);
    let east_parking = MapPoint::new(14, 10);
    map.set_tile(west_parking, TileType::Parking)?;
    map.set_tile(east_parking, TileType::Parking)?;

    let addresses = StartingTownAddresses {
        west_parking,
        east_parking,
        corner_plot: MapPoint::new(7, 7),
        remote_plot: MapPoint::new(21, 3),
        town_hall,
    };
    tracing::info!(
        occupied = map.occupied_tiles().count(),
        "Starting town created"
    );
    Ok((map, addresses))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_town_builds() {
        let result = create_starting_town();
        assert!(result.is_ok());
        let Ok((map, addresses)) = result else {
            return;
        };
        assert_eq!(map.width(), STARTING_TOWN_SIZE);
        assert_eq!(
            map.tile(addresses.west_parking).map(|t| t.tile_type),
            Some(TileType::Parking)
        );
        assert_eq!(
            map.tile(addresses.corner_plot).map(|t| t.tile_type),
            Some(TileType::Vacant)
        );
        assert_eq!(
            map.tile(MapPoint::new(6, 3)).map(|t| t.tile_type),
            Some(TileType::Street)
        );
    }

    #[test]
    fn parkings_compete_within_four_rings() {
        let Ok((_, addresses)) = create_starting_town() else {
            return;
        };
        let distance = addresses
            .west_parking
            .chebyshev_distance(addresses.east_parking);
        assert!((1..=4).contains(&distance));
    }
}
