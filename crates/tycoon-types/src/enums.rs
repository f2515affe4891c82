//! Enumeration types for the Tycoon economy core.
//!
//! Tile types describe what the map renders at an address; property kinds
//! describe what can be owned there. The two are linked through
//! [`TileType::property_kind`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Property kinds
// ---------------------------------------------------------------------------

/// The ownable kinds of property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PropertyKind {
    /// An undeveloped parcel.
    Land,
    /// A street segment.
    Road,
    /// A parking lot business.
    Parking,
    /// A residential building with one or more storeys.
    ResidentialBuilding,
}

impl PropertyKind {
    /// Human-readable name used in announcements and invoice titles.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::Road => "road",
            Self::Parking => "parking",
            Self::ResidentialBuilding => "residential building",
        }
    }
}

// ---------------------------------------------------------------------------
// Map tiles
// ---------------------------------------------------------------------------

/// What the map renders at a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TileType {
    /// Virgin land nobody has ever recorded.
    Vacant,
    /// Recorded, undeveloped land.
    Land,
    /// A street tile.
    Street,
    /// A parking lot.
    Parking,
    /// A residential building.
    ResidentialBuilding {
        /// Number of storeys.
        storeys: u8,
    },
    /// An office block. Raises nearby land value, never sold here.
    Office,
    /// Police station, court, town hall.
    CivicBuilding,
    /// A school.
    School,
    /// A hospital.
    Hospital,
    /// A football pitch.
    FootballPitch,
    /// A warehouse.
    Warehouse,
    /// A broadcasting antenna.
    Antenna,
    /// A site under construction.
    Construction {
        /// What the site becomes once finished.
        target: PropertyKind,
    },
}

impl TileType {
    /// The ownable property kind this tile maps to, if any.
    pub const fn property_kind(self) -> Option<PropertyKind> {
        match self {
            Self::Vacant | Self::Land => Some(PropertyKind::Land),
            Self::Street => Some(PropertyKind::Road),
            Self::Parking => Some(PropertyKind::Parking),
            Self::ResidentialBuilding { .. } => Some(PropertyKind::ResidentialBuilding),
            Self::Construction { target } => Some(target),
            Self::Office
            | Self::CivicBuilding
            | Self::School
            | Self::Hospital
            | Self::FootballPitch
            | Self::Warehouse
            | Self::Antenna => None,
        }
    }

    /// Whether this tile is a street.
    pub const fn is_street(self) -> bool {
        matches!(self, Self::Street)
    }

    /// Whether this tile counts as a building for land valuation.
    pub const fn is_building_or_office(self) -> bool {
        matches!(self, Self::ResidentialBuilding { .. } | Self::Office)
    }

    /// Whether this tile is an antenna.
    pub const fn is_antenna(self) -> bool {
        matches!(self, Self::Antenna)
    }

    /// Whether this tile is a parking lot.
    pub const fn is_parking(self) -> bool {
        matches!(self, Self::Parking)
    }

    /// Whether anything other than virgin land occupies the tile.
    pub const fn is_occupied(self) -> bool {
        !matches!(self, Self::Vacant)
    }
}

// ---------------------------------------------------------------------------
// Ledger transaction kinds
// ---------------------------------------------------------------------------

/// Tag describing why money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TransactionKind {
    /// Buyer pays the seller for a property.
    PropertyPurchase,
    /// Buyer pays the real estate agency.
    Commission,
    /// Treasury returns part of previously collected income tax.
    IncomeTaxRefund,
    /// Owner pays for a construction.
    Construction,
    /// Court fine or seizure; may overdraw the payer.
    Fine,
    /// Business income paid to an owner.
    Income,
    /// Anything not covered above.
    Other,
}

// ---------------------------------------------------------------------------
// Register / construction state
// ---------------------------------------------------------------------------

/// Status of a property as tracked by the ownership register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RegisterStatus {
    /// Usable property.
    Active,
    /// Construction in progress.
    UnderConstruction,
}

/// Construction progress of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ConstructionState {
    /// Nothing being built.
    #[default]
    Ready,
    /// Works started and not yet finished.
    UnderConstruction {
        /// Month the works started.
        started_month: u32,
        /// Month the works finish.
        finish_month: u32,
    },
}

impl ConstructionState {
    /// Whether works are in progress.
    pub const fn is_under_construction(self) -> bool {
        matches!(self, Self::UnderConstruction { .. })
    }

    /// The matching register status.
    pub const fn register_status(self) -> RegisterStatus {
        match self {
            Self::Ready => RegisterStatus::Active,
            Self::UnderConstruction { .. } => RegisterStatus::UnderConstruction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownable_tiles_map_to_kinds() {
        assert_eq!(TileType::Vacant.property_kind(), Some(PropertyKind::Land));
        assert_eq!(TileType::Street.property_kind(), Some(PropertyKind::Road));
        assert_eq!(
            TileType::ResidentialBuilding { storeys: 4 }.property_kind(),
            Some(PropertyKind::ResidentialBuilding)
        );
        assert_eq!(
            TileType::Construction {
                target: PropertyKind::Parking
            }
            .property_kind(),
            Some(PropertyKind::Parking)
        );
    }

    #[test]
    fn civic_tiles_are_not_ownable() {
        for tile in [
            TileType::CivicBuilding,
            TileType::School,
            TileType::Hospital,
            TileType::Antenna,
            TileType::Office,
        ] {
            assert_eq!(tile.property_kind(), None, "{tile:?} should not be ownable");
        }
    }

    #[test]
    fn construction_state_drives_register_status() {
        assert_eq!(
            ConstructionState::Ready.register_status(),
            RegisterStatus::Active
        );
        let building = ConstructionState::UnderConstruction {
            started_month: 3,
            finish_month: 7,
        };
        assert!(building.is_under_construction());
        assert_eq!(building.register_status(), RegisterStatus::UnderConstruction);
    }
}
