//! The game month clock.
//!
//! The market never advances time itself; it only reads the current month
//! to stamp transactions and finish constructions.

use std::sync::atomic::{AtomicU32, Ordering};

/// Read-only access to the current game month.
pub trait MonthClock: Send + Sync {
    /// The current month, starting at 0.
    fn current_month(&self) -> u32;
}

/// Clock advanced by the simulation loop.
#[derive(Debug, Default)]
pub struct SimulationClock {
    month: AtomicU32,
}

impl SimulationClock {
    /// Start the clock at a given month.
    pub const fn starting_at(month: u32) -> Self {
        Self {
            month: AtomicU32::new(month),
        }
    }

    /// Advance one month and return the new month.
    pub fn advance(&self) -> u32 {
        let previous = self.month.fetch_add(1, Ordering::AcqRel);
        previous.saturating_add(1)
    }
}

impl MonthClock for SimulationClock {
    fn current_month(&self) -> u32 {
        self.month.load(Ordering::Acquire)
    }
}

/// A clock stuck at one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u32);

impl MonthClock for FixedClock {
    fn current_month(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_clock_advances() {
        let clock = SimulationClock::starting_at(3);
        assert_eq!(clock.current_month(), 3);
        assert_eq!(clock.advance(), 4);
        assert_eq!(clock.current_month(), 4);
    }

    #[test]
    fn fixed_clock_never_moves() {
        assert_eq!(FixedClock(7).current_month(), 7);
    }
}
