//! Core entity structs: map addresses, properties, adverts, parking state
//! and the ownership register.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ConstructionState, PropertyKind, RegisterStatus, TileType, TransactionKind};
use crate::ids::{PlayerId, PropertyId, TransactionId};
use crate::money::Invoice;

// ---------------------------------------------------------------------------
// Map address
// ---------------------------------------------------------------------------

/// A grid address on the city map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl MapPoint {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`.
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Shift the point, `None` on coordinate overflow.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }
}

impl core::fmt::Display for MapPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Ownable capability
// ---------------------------------------------------------------------------

/// Capability shared by everything that records ownership of an address.
pub trait Ownable {
    /// Property identifier.
    fn id(&self) -> PropertyId;
    /// Current owner.
    fn owner_id(&self) -> PlayerId;
    /// Map address.
    fn address(&self) -> MapPoint;
    /// Property kind.
    fn kind(&self) -> PropertyKind;
}

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// Variant-specific data of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PropertyDetails {
    /// Undeveloped land.
    Land,
    /// A street.
    Road,
    /// A parking lot. Business state lives in [`ParkingState`].
    Parking,
    /// A residential building.
    ResidentialBuilding {
        /// Number of storeys.
        storeys: u8,
    },
}

impl PropertyDetails {
    /// The property kind of this variant.
    pub const fn kind(self) -> PropertyKind {
        match self {
            Self::Land => PropertyKind::Land,
            Self::Road => PropertyKind::Road,
            Self::Parking => PropertyKind::Parking,
            Self::ResidentialBuilding { .. } => PropertyKind::ResidentialBuilding,
        }
    }
}

/// A recorded property at a single address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Property {
    /// Property identifier, preserved across conversions.
    pub id: PropertyId,
    /// Current owner.
    pub owner_id: PlayerId,
    /// Map address.
    pub address: MapPoint,
    /// Net price the current owner paid.
    #[ts(as = "String")]
    pub purchase_net_value: Decimal,
    /// Net value of investments (construction) made by the current owner.
    #[ts(as = "String")]
    pub investments_net_value: Decimal,
    /// Construction progress.
    pub construction: ConstructionState,
    /// Variant-specific data.
    pub details: PropertyDetails,
}

impl Property {
    /// Record a land parcel.
    pub fn land(owner_id: PlayerId, address: MapPoint, purchase_net_value: Decimal) -> Self {
        Self {
            id: PropertyId::new(),
            owner_id,
            address,
            purchase_net_value,
            investments_net_value: Decimal::ZERO,
            construction: ConstructionState::Ready,
            details: PropertyDetails::Land,
        }
    }

    /// Convert the property into another variant, keeping its identity.
    #[must_use]
    pub const fn converted(mut self, details: PropertyDetails, construction: ConstructionState) -> Self {
        self.details = details;
        self.construction = construction;
        self
    }

    /// Purchase price plus investments.
    pub fn total_costs(&self) -> Decimal {
        self.purchase_net_value
            .saturating_add(self.investments_net_value)
    }

    /// Storey count for residential buildings.
    pub const fn storeys(&self) -> Option<u8> {
        match self.details {
            PropertyDetails::ResidentialBuilding { storeys } => Some(storeys),
            PropertyDetails::Land | PropertyDetails::Road | PropertyDetails::Parking => None,
        }
    }

    /// The tile the map must render for this property.
    pub const fn tile_type(&self) -> TileType {
        if self.construction.is_under_construction() {
            return TileType::Construction {
                target: self.details.kind(),
            };
        }
        match self.details {
            PropertyDetails::Land => TileType::Land,
            PropertyDetails::Road => TileType::Street,
            PropertyDetails::Parking => TileType::Parking,
            PropertyDetails::ResidentialBuilding { storeys } => {
                TileType::ResidentialBuilding { storeys }
            }
        }
    }

    /// Build the register entry mirroring this property.
    pub const fn register_entry(&self) -> PropertyRegister {
        PropertyRegister {
            property_id: self.id,
            owner_id: self.owner_id,
            address: self.address,
            kind: self.details.kind(),
            status: self.construction.register_status(),
        }
    }
}

impl Ownable for Property {
    fn id(&self) -> PropertyId {
        self.id
    }

    fn owner_id(&self) -> PlayerId {
        self.owner_id
    }

    fn address(&self) -> MapPoint {
        self.address
    }

    fn kind(&self) -> PropertyKind {
        self.details.kind()
    }
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// Denormalized ownership index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PropertyRegister {
    /// The property this entry mirrors.
    pub property_id: PropertyId,
    /// Current owner.
    pub owner_id: PlayerId,
    /// Map address.
    pub address: MapPoint,
    /// Property kind.
    pub kind: PropertyKind,
    /// Usability status.
    pub status: RegisterStatus,
}

impl Ownable for PropertyRegister {
    fn id(&self) -> PropertyId {
        self.property_id
    }

    fn owner_id(&self) -> PlayerId {
        self.owner_id
    }

    fn address(&self) -> MapPoint {
        self.address
    }

    fn kind(&self) -> PropertyKind {
        self.kind
    }
}

// ---------------------------------------------------------------------------
// Sale advert
// ---------------------------------------------------------------------------

/// A published asking price for the property at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SaleAdvert {
    /// Address of the advertised property.
    pub address: MapPoint,
    /// Asking net price.
    #[ts(as = "String")]
    pub net_price: Decimal,
}

// ---------------------------------------------------------------------------
// Parking business state
// ---------------------------------------------------------------------------

/// Business state of a parking lot.
///
/// The trust level is clamped into `[0, 1]` on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParkingState {
    /// Address of the parking lot.
    pub address: MapPoint,
    #[ts(as = "String")]
    trust_level: Decimal,
    /// Security service tier.
    pub security_tier: u8,
    /// Insurance tier.
    pub insurance_tier: u8,
    /// Advertising tier.
    pub advertising_tier: u8,
}

impl ParkingState {
    /// New parking business with full trust and no services.
    pub const fn new(address: MapPoint) -> Self {
        Self {
            address,
            trust_level: Decimal::ONE,
            security_tier: 0,
            insurance_tier: 0,
            advertising_tier: 0,
        }
    }

    /// Current trust level.
    pub const fn trust_level(&self) -> Decimal {
        self.trust_level
    }

    /// Set the trust level, clamped into `[0, 1]`.
    pub fn set_trust_level(&mut self, value: Decimal) {
        self.trust_level = value.clamp(Decimal::ZERO, Decimal::ONE);
    }
}

// ---------------------------------------------------------------------------
// Financial transaction
// ---------------------------------------------------------------------------

/// One two-party money movement processed by the ledger.
///
/// The payer is debited the invoice total, the recipient credited the net
/// value and the tax goes to the treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FinancialTransaction {
    /// Unique transaction identifier.
    pub id: TransactionId,
    /// Player debited the invoice total.
    pub payer_id: PlayerId,
    /// Player credited the invoice net value.
    pub recipient_id: PlayerId,
    /// What is being paid.
    pub invoice: Invoice,
    /// Why the money moved.
    pub kind: TransactionKind,
    /// Game month the transaction belongs to.
    pub month: u32,
    /// Real-world timestamp.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// System accounts
// ---------------------------------------------------------------------------

/// The system-owned player accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemAccounts {
    /// Owner of all unsold land; implicitly sells at the estimated value.
    pub government: PlayerId,
    /// Receives every tax and pays refunds.
    pub treasury: PlayerId,
    /// Real estate agency collecting commissions.
    pub agency: PlayerId,
}

impl SystemAccounts {
    /// Generate fresh system account ids.
    pub fn generate() -> Self {
        Self {
            government: PlayerId::new(),
            treasury: PlayerId::new(),
            agency: PlayerId::new(),
        }
    }

    /// Whether the player is one of the system accounts.
    pub fn is_system(&self, player: PlayerId) -> bool {
        player == self.government || player == self.treasury || player == self.agency
    }
}
