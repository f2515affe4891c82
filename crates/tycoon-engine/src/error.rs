//! Error types for the market session binary.
//!
//! [`EngineError`] wraps every failure mode of startup and of the scripted
//! session so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tycoon_market::ConfigError,
    },

    /// Starting town construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: tycoon_world::WorldError,
    },

    /// Market storage failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: tycoon_market::StoreError,
    },

    /// A property could not be valued.
    #[error("valuation error: {source}")]
    Valuation {
        /// The underlying valuation error.
        #[from]
        source: tycoon_market::ValuationError,
    },

    /// A scripted purchase failed.
    #[error("purchase error: {source}")]
    Purchase {
        /// The underlying purchase error.
        #[from]
        source: tycoon_market::BuyPropertyError,
    },

    /// Publishing an advert failed.
    #[error("advert error: {source}")]
    Advert {
        /// The underlying advert error.
        #[from]
        source: tycoon_market::RegisterOfferError,
    },

    /// Changing an advert price failed.
    #[error("advert update error: {source}")]
    AdvertUpdate {
        /// The underlying update error.
        #[from]
        source: tycoon_market::UpdateOfferError,
    },

    /// Starting or finishing construction failed.
    #[error("construction error: {source}")]
    Construction {
        /// The underlying construction error.
        #[from]
        source: tycoon_market::ConstructionError,
    },

    /// The ledger journal failed its conservation audit.
    #[error("ledger anomaly in month {month}: {message}")]
    Ledger {
        /// The month that failed the audit.
        month: u32,
        /// Description of the anomaly.
        message: String,
    },

    /// Session output could not be serialized.
    #[error("serialization error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
