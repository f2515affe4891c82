//! Property market for the Tycoon economy core.
//!
//! Three components sit on top of the ledger and the city map:
//!
//! - [`Valuer`] estimates what land, roads, parking lots and buildings are
//!   worth from their location and construction cost.
//! - [`DemandAllocator`] splits the cars that nearby destinations bring
//!   between competing parking lots by trust level.
//! - [`MarketAgent`] publishes adverts, runs purchases through the ledger
//!   and converts land into roads, parking lots and buildings.
//!
//! Every collaborator is injected through [`MarketContext`] as a trait
//! object: map queries, storage, construction pricing, the month clock and
//! event delivery. In-memory implementations of each are included.

pub mod agent;
pub mod clock;
pub mod commission;
pub mod config;
pub mod context;
pub mod demand;
pub mod error;
pub mod events;
pub mod offer;
pub mod quote;
pub mod store;
pub mod valuer;

pub use agent::MarketAgent;
pub use clock::{FixedClock, MonthClock, SimulationClock};
pub use commission::{commission_invoice, commission_net_value};
pub use config::{
    AccountsConfig, CommissionConfig, ConfigError, ConstructionConfig, DemandConfig, LoggingConfig,
    MarketConfig, TaxConfig, ValuationConfig,
};
pub use context::MarketContext;
pub use demand::{DemandAllocator, DemandReport, TileAllocation};
pub use error::{
    BuyPropertyError, ConstructionError, QuoteError, RegisterOfferError, StoreError,
    UpdateOfferError, ValuationError,
};
pub use events::{CollectingNotifier, MarketEvent, MarketNotifier, TracingNotifier};
pub use offer::{OfferSource, PurchaseReceipt, SaleOffer};
pub use quote::{ConstructionQuote, ConstructionQuoter, PriceListQuoter};
pub use store::{InMemoryStore, MarketStore};
pub use valuer::{LocationFactors, ValuationReport, Valuer};
