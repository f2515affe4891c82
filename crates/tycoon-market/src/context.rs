//! Collaborators shared by the valuer, the demand allocator and the agent.

use std::sync::Arc;

use tycoon_ledger::{Ledger, WalletStore};
use tycoon_types::SystemAccounts;
use tycoon_world::{MapEditor, SharedMap, SpatialQuery};

use crate::clock::{FixedClock, MonthClock};
use crate::config::MarketConfig;
use crate::events::{MarketNotifier, TracingNotifier};
use crate::quote::{ConstructionQuoter, PriceListQuoter};
use crate::store::{InMemoryStore, MarketStore};

/// Everything the market components read from or write to.
///
/// Fields are public so callers can swap a single collaborator with struct
/// update syntax:
///
/// ```
/// # use std::sync::Arc;
/// # use tycoon_ledger::InMemoryWallets;
/// # use tycoon_market::{MarketConfig, MarketContext, MonthClock, SimulationClock};
/// # use tycoon_types::SystemAccounts;
/// # use tycoon_world::{GameMap, SharedMap};
/// let map = Arc::new(SharedMap::new(GameMap::new(8, 8).unwrap()));
/// let wallets = Arc::new(InMemoryWallets::new());
/// let clock = Arc::new(SimulationClock::starting_at(1));
/// let ctx = MarketContext {
///     clock: clock.clone(),
///     ..MarketContext::in_memory(map, wallets, SystemAccounts::generate(), MarketConfig::default())
/// };
/// clock.advance();
/// assert_eq!(ctx.clock.current_month(), 2);
/// ```
#[derive(Clone)]
pub struct MarketContext {
    /// Map reads.
    pub map: Arc<dyn SpatialQuery>,
    /// Map writes.
    pub editor: Arc<dyn MapEditor>,
    /// Properties, adverts, parking states, register.
    pub store: Arc<dyn MarketStore>,
    /// Money movements.
    pub ledger: Arc<Ledger>,
    /// Construction pricing.
    pub quoter: Arc<dyn ConstructionQuoter>,
    /// Current game month.
    pub clock: Arc<dyn MonthClock>,
    /// Event delivery.
    pub notifier: Arc<dyn MarketNotifier>,
    /// Government, treasury and agency accounts.
    pub accounts: SystemAccounts,
    /// Tunable factors.
    pub config: MarketConfig,
}

impl core::fmt::Debug for MarketContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MarketContext")
            .field("accounts", &self.accounts)
            .field("month", &self.clock.current_month())
            .finish_non_exhaustive()
    }
}

impl MarketContext {
    /// Wire an in-memory market over a shared map and a wallet store.
    ///
    /// Uses an empty [`InMemoryStore`], a [`PriceListQuoter`] from `config`,
    /// a clock fixed at month 0 and a [`TracingNotifier`].
    pub fn in_memory(
        map: Arc<SharedMap>,
        wallets: Arc<dyn WalletStore>,
        accounts: SystemAccounts,
        config: MarketConfig,
    ) -> Self {
        let ledger = Ledger::new(wallets, accounts.treasury, config.taxes.income);
        let quoter = PriceListQuoter::new(config.construction.clone(), &config.taxes);
        Self {
            map: map.clone(),
            editor: map,
            store: Arc::new(InMemoryStore::new()),
            ledger: Arc::new(ledger),
            quoter: Arc::new(quoter),
            clock: Arc::new(FixedClock(0)),
            notifier: Arc::new(TracingNotifier),
            accounts,
            config,
        }
    }
}
