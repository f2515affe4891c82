//! City grid, tiles and spatial queries for the Tycoon economy core.
//!
//! # Modules
//!
//! - [`error`] -- Error types for map operations.
//! - [`grid`] -- [`GameMap`]: the tile grid with Chebyshev ring queries.
//! - [`spatial`] -- The [`SpatialQuery`] and [`MapEditor`] seams and the
//!   lock-guarded [`SharedMap`].
//! - [`starting_town`] -- Default map used to seed new games.

pub mod error;
pub mod grid;
pub mod spatial;
pub mod starting_town;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::{GameMap, Tile};
pub use spatial::{MapEditor, SharedMap, SpatialQuery};
pub use starting_town::{STARTING_TOWN_SIZE, StartingTownAddresses, create_starting_town};
