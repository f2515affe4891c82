//! Shared type definitions for the Tycoon economy core.
//!
//! This crate is the single source of truth for the types flowing between
//! the ledger, the map and the market. Types defined here are exported to
//! `TypeScript` via `ts-rs` for the game client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for players, properties, transactions
//! - [`enums`] -- Property kinds, map tiles, transaction tags, construction state
//! - [`money`] -- Whole-unit rounding and the immutable [`Invoice`]
//! - [`structs`] -- Map addresses, properties, adverts, parking state, register

pub mod enums;
pub mod ids;
pub mod money;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ConstructionState, PropertyKind, RegisterStatus, TileType, TransactionKind};
pub use ids::{PlayerId, PropertyId, TransactionId};
pub use money::{Invoice, mul_money, round_money};
pub use structs::{
    FinancialTransaction, MapPoint, Ownable, ParkingState, Property, PropertyDetails,
    PropertyRegister, SaleAdvert, SystemAccounts,
};
