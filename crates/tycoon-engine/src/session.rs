//! Scripted market session over the starting town.
//!
//! Two players trade on the starting town month by month: they buy
//! government land and a parking lot, build an apartment block, advertise
//! it and resell it. Every step prints its outcome as one JSON line on
//! stdout followed by the market events it produced.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use tycoon_ledger::{ConservationResult, InMemoryWallets, WalletStore};
use tycoon_market::{
    BuyPropertyError, CollectingNotifier, DemandAllocator, MarketAgent, MarketConfig,
    MarketContext, MonthClock, SimulationClock,
};
use tycoon_types::{MapPoint, PlayerId, PropertyDetails, SystemAccounts};
use tycoon_world::{SharedMap, StartingTownAddresses};

use crate::error::EngineError;

/// Upper bound on months waited for the apartment block to finish.
const MAX_CONSTRUCTION_MONTHS: u32 = 24;

/// Final balances and audit totals of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Month the session ended in.
    pub month: u32,
    /// Wallet balance per participant name.
    pub balances: BTreeMap<&'static str, Decimal>,
    /// Tax collected by the treasury over the whole session.
    pub treasury_intake: Decimal,
    /// Sum of all wallets. Must equal the opening supply.
    pub total_supply: Decimal,
    /// Transactions in the ledger journal.
    pub transactions: usize,
}

/// A market with two players and a month clock driven by the session.
pub struct Session {
    agent: MarketAgent,
    clock: Arc<SimulationClock>,
    events: Arc<CollectingNotifier>,
    wallets: Arc<InMemoryWallets>,
    town: StartingTownAddresses,
    alice: PlayerId,
    bob: PlayerId,
}

impl Session {
    /// Open wallets for the system accounts and two players and wire the
    /// market over `map`.
    pub fn new(map: Arc<SharedMap>, town: StartingTownAddresses, config: MarketConfig) -> Self {
        let accounts = SystemAccounts::generate();
        let alice = PlayerId::new();
        let bob = PlayerId::new();

        let wallets = Arc::new(InMemoryWallets::new());
        wallets.open_wallet(accounts.government, Decimal::ZERO);
        wallets.open_wallet(accounts.agency, Decimal::ZERO);
        wallets.open_wallet(accounts.treasury, config.accounts.treasury_starting_balance);
        wallets.open_wallet(alice, config.accounts.player_starting_balance);
        wallets.open_wallet(bob, config.accounts.player_starting_balance);

        let clock = Arc::new(SimulationClock::starting_at(0));
        let events = Arc::new(CollectingNotifier::new());
        let ctx = MarketContext {
            clock: clock.clone(),
            notifier: events.clone(),
            ..MarketContext::in_memory(map, wallets.clone(), accounts, config)
        };

        Self {
            agent: MarketAgent::new(ctx),
            clock,
            events,
            wallets,
            town,
            alice,
            bob,
        }
    }

    /// Run every step of the script and return the closing summary.
    ///
    /// # Errors
    ///
    /// Returns an error if a scripted step fails or the ledger journal
    /// does not balance.
    pub fn run(&self) -> Result<SessionSummary, EngineError> {
        let opening_supply = self.wallets.total_supply();

        self.survey()?;
        self.buy_plots()?;
        let block = self.build_apartment_block()?;
        self.resell(block)?;
        self.audit()?;

        let summary = self.summary()?;
        if summary.total_supply != opening_supply {
            warn!(
                opening = %opening_supply,
                closing = %summary.total_supply,
                "Money supply changed during the session"
            );
        }
        Ok(summary)
    }

    /// Print valuation and parking demand reports for the landmarks.
    fn survey(&self) -> Result<(), EngineError> {
        let landmarks = [
            ("corner_plot", self.town.corner_plot),
            ("remote_plot", self.town.remote_plot),
            ("west_parking", self.town.west_parking),
            ("east_parking", self.town.east_parking),
            ("town_hall", self.town.town_hall),
        ];
        for (name, address) in landmarks {
            if let Some(report) = self.agent.valuer().valuation_report(address)? {
                emit(name, &report)?;
            } else {
                info!(landmark = name, %address, "Not for sale");
            }
        }

        let demand = DemandAllocator::from_context(self.agent.context());
        for address in [self.town.west_parking, self.town.east_parking] {
            emit("parking_demand", &demand.demand_report(address)?)?;
        }
        Ok(())
    }

    /// Alice buys the corner plot, Bob buys the east parking lot.
    fn buy_plots(&self) -> Result<(), EngineError> {
        let plot = self.agent.buy_property(self.town.corner_plot, self.alice, None)?;
        emit("purchase", &plot)?;
        self.flush_events()?;

        let parking = self.agent.buy_property(self.town.east_parking, self.bob, None)?;
        emit("purchase", &parking)?;
        self.flush_events()
    }

    /// Build on the corner plot and advance months until the works finish.
    fn build_apartment_block(&self) -> Result<MapPoint, EngineError> {
        let address = self.town.corner_plot;
        let storeys = self.agent.context().config.construction.default_storeys;
        let property = self.agent.start_construction(
            address,
            self.alice,
            PropertyDetails::ResidentialBuilding { storeys },
        )?;
        emit("construction_started", &property)?;
        self.flush_events()?;

        for _ in 0..MAX_CONSTRUCTION_MONTHS {
            let month = self.clock.advance();
            let finished = self.agent.finish_due_constructions()?;
            self.flush_events()?;
            if finished.contains(&address) {
                info!(month, %address, "Apartment block finished");
                return Ok(address);
            }
        }
        warn!(%address, "Apartment block still under construction");
        Ok(address)
    }

    /// Alice advertises the block, Bob bids once with a stale price and
    /// then buys at the current one.
    fn resell(&self, address: MapPoint) -> Result<(), EngineError> {
        let Some(estimate) = self.agent.valuer().estimate_value(address)? else {
            warn!(%address, "Block has no estimate, skipping resale");
            return Ok(());
        };
        self.agent.register_sale_offer(address, estimate)?;
        let asking = estimate.saturating_add(Decimal::new(10_000, 0));
        self.agent.update_sale_offer(address, asking)?;
        emit("advert", &self.agent.adverts()?)?;

        match self.agent.buy_property(address, self.bob, Some(estimate)) {
            Err(BuyPropertyError::SaleOfferHasChanged { expected, actual }) => {
                info!(%expected, %actual, "Stale bid rejected");
            }
            Ok(receipt) => emit("purchase", &receipt)?,
            Err(e) => return Err(e.into()),
        }

        match self.agent.buy_property(address, self.bob, Some(asking)) {
            Ok(receipt) => emit("purchase", &receipt)?,
            Err(BuyPropertyError::FinancialTransactionProblem(e)) => {
                warn!(error = %e, %address, "Bob could not afford the block");
            }
            Err(e) => return Err(e.into()),
        }
        emit("portfolio", &self.agent.properties_of(self.bob)?)?;
        self.flush_events()
    }

    /// Check every elapsed month against the conservation law.
    fn audit(&self) -> Result<(), EngineError> {
        let ledger = &self.agent.context().ledger;
        for month in 0..=self.clock.current_month() {
            match ledger.verify_conservation(month) {
                ConservationResult::Balanced => {
                    info!(month, intake = %ledger.treasury_intake(month), "Month balanced");
                }
                ConservationResult::Anomaly(anomaly) => {
                    return Err(EngineError::Ledger {
                        month,
                        message: anomaly.message,
                    });
                }
            }
        }
        Ok(())
    }

    fn summary(&self) -> Result<SessionSummary, EngineError> {
        let ctx = self.agent.context();
        let accounts = ctx.accounts;
        let participants = [
            ("alice", self.alice),
            ("bob", self.bob),
            ("government", accounts.government),
            ("treasury", accounts.treasury),
            ("agency", accounts.agency),
        ];
        let balances = participants
            .into_iter()
            .filter_map(|(name, id)| self.wallets.balance(id).map(|balance| (name, balance)))
            .collect();

        let month = self.clock.current_month();
        let treasury_intake = (0..=month)
            .map(|m| ctx.ledger.treasury_intake(m))
            .fold(Decimal::ZERO, Decimal::saturating_add);

        let summary = SessionSummary {
            month,
            balances,
            treasury_intake,
            total_supply: self.wallets.total_supply(),
            transactions: ctx.ledger.journal().len(),
        };
        emit("summary", &summary)?;
        Ok(summary)
    }

    fn flush_events(&self) -> Result<(), EngineError> {
        for event in self.events.drain() {
            emit("event", &event)?;
        }
        Ok(())
    }
}

/// Print one step outcome as a JSON line.
fn emit<T: Serialize>(step: &str, data: &T) -> Result<(), EngineError> {
    let line = serde_json::to_string(&serde_json::json!({ "step": step, "data": data }))?;
    println!("{line}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Option<Session> {
        let (map, town) = tycoon_world::create_starting_town().ok()?;
        Some(Session::new(
            Arc::new(SharedMap::new(map)),
            town,
            MarketConfig::default(),
        ))
    }

    #[test]
    fn session_conserves_money() {
        let Some(session) = session() else {
            return;
        };
        let opening = session.wallets.total_supply();
        let summary = session.run();
        assert!(summary.is_ok());
        let Some(summary) = summary.ok() else {
            return;
        };
        assert_eq!(summary.total_supply, opening);
        assert!(summary.treasury_intake > Decimal::ZERO);
        assert!(summary.month >= 1);
    }

    #[test]
    fn session_transfers_the_block_to_bob() {
        let Some(session) = session() else {
            return;
        };
        assert!(session.run().is_ok());
        let owned = session.agent.properties_of(session.bob).ok().unwrap_or_default();
        assert!(owned.iter().any(|entry| entry.address == session.town.corner_plot));
        assert!(owned.iter().any(|entry| entry.address == session.town.east_parking));
    }
}
