//! Error types for the `tycoon-world` crate.

use tycoon_types::MapPoint;

/// Errors that can occur during map operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The address lies outside the map.
    #[error("address {0} is not on the map")]
    OffMap(MapPoint),

    /// The map must have at least one row and one column.
    #[error("invalid map size {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The map lock was poisoned by a panicking writer.
    #[error("map unavailable: lock poisoned")]
    Poisoned,
}
