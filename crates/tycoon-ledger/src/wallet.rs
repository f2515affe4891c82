//! Wallet storage.
//!
//! The [`WalletStore`] trait is the persistence seam for player balances.
//! A store must apply a [`WalletMovement`] atomically: either every wallet
//! involved changes or none does.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rust_decimal::Decimal;

use tycoon_types::PlayerId;

use crate::FinancialTransactionError;

/// The three-sided balance change produced by one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletMovement {
    /// Player losing money.
    pub payer: PlayerId,
    /// Amount taken from the payer.
    pub debit: Decimal,
    /// Player receiving the net value.
    pub recipient: PlayerId,
    /// Amount given to the recipient.
    pub credit: Decimal,
    /// Treasury account receiving the tax.
    pub treasury: PlayerId,
    /// Amount given to the treasury.
    pub tax: Decimal,
    /// Refuse the movement when the payer cannot cover the debit.
    pub check_capacity: bool,
}

/// Persistence seam for player balances.
pub trait WalletStore: Send + Sync {
    /// Current balance, `None` when the player has no wallet.
    fn balance(&self, player: PlayerId) -> Option<Decimal>;

    /// Apply a movement atomically.
    ///
    /// # Errors
    ///
    /// Returns [`FinancialTransactionError::WalletNotFound`] when a
    /// participant has no wallet, [`FinancialTransactionError::NotEnoughMoney`]
    /// when capacity is checked and the payer cannot cover the debit, and
    /// [`FinancialTransactionError::ArithmeticOverflow`] on overflow. No
    /// balance changes on error.
    fn apply(&self, movement: &WalletMovement) -> Result<(), FinancialTransactionError>;
}

/// In-memory [`WalletStore`] guarded by a single mutex.
#[derive(Debug, Default)]
pub struct InMemoryWallets {
    balances: Mutex<BTreeMap<PlayerId, Decimal>>,
}

impl InMemoryWallets {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            balances: Mutex::new(BTreeMap::new()),
        }
    }

    /// Open (or reset) a wallet with the given balance.
    pub fn open_wallet(&self, player: PlayerId, balance: Decimal) {
        let Ok(mut balances) = self.balances.lock() else {
            tracing::error!(%player, "wallet store poisoned, wallet not opened");
            return;
        };
        balances.insert(player, balance);
    }

    /// Sum of all balances. Constant across every successful movement.
    pub fn total_supply(&self) -> Decimal {
        let Ok(balances) = self.balances.lock() else {
            return Decimal::ZERO;
        };
        balances
            .values()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_add(*b))
    }
}

impl WalletStore for InMemoryWallets {
    fn balance(&self, player: PlayerId) -> Option<Decimal> {
        let Ok(balances) = self.balances.lock() else {
            return None;
        };
        balances.get(&player).copied()
    }

    fn apply(&self, movement: &WalletMovement) -> Result<(), FinancialTransactionError> {
        let mut balances = self
            .balances
            .lock()
            .map_err(|_poison| FinancialTransactionError::StoreUnavailable("wallet mutex poisoned"))?;

        let payer_balance = *balances
            .get(&movement.payer)
            .ok_or(FinancialTransactionError::WalletNotFound(movement.payer))?;
        for player in [movement.recipient, movement.treasury] {
            if !balances.contains_key(&player) {
                return Err(FinancialTransactionError::WalletNotFound(player));
            }
        }

        if movement.check_capacity && payer_balance < movement.debit {
            return Err(FinancialTransactionError::NotEnoughMoney {
                payer: movement.payer,
                balance: payer_balance,
                required: movement.debit,
            });
        }

        // Net the deltas per player first so a payer that is also the
        // treasury is handled, then write only after every sum succeeded.
        let mut deltas: BTreeMap<PlayerId, Decimal> = BTreeMap::new();
        for (player, delta) in [
            (movement.payer, Decimal::ZERO.saturating_sub(movement.debit)),
            (movement.recipient, movement.credit),
            (movement.treasury, movement.tax),
        ] {
            let entry = deltas.entry(player).or_insert(Decimal::ZERO);
            *entry = entry
                .checked_add(delta)
                .ok_or(FinancialTransactionError::ArithmeticOverflow)?;
        }

        let mut updated: Vec<(PlayerId, Decimal)> = Vec::with_capacity(deltas.len());
        for (player, delta) in deltas {
            let current = balances.get(&player).copied().unwrap_or(Decimal::ZERO);
            let next = current
                .checked_add(delta)
                .ok_or(FinancialTransactionError::ArithmeticOverflow)?;
            updated.push((player, next));
        }
        balances.extend(updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn setup(payer_balance: Decimal) -> (InMemoryWallets, PlayerId, PlayerId, PlayerId) {
        let wallets = InMemoryWallets::new();
        let payer = PlayerId::new();
        let recipient = PlayerId::new();
        let treasury = PlayerId::new();
        wallets.open_wallet(payer, payer_balance);
        wallets.open_wallet(recipient, Decimal::ZERO);
        wallets.open_wallet(treasury, Decimal::ZERO);
        (wallets, payer, recipient, treasury)
    }

    fn movement(
        payer: PlayerId,
        recipient: PlayerId,
        treasury: PlayerId,
        check_capacity: bool,
    ) -> WalletMovement {
        WalletMovement {
            payer,
            debit: dec!(110),
            recipient,
            credit: dec!(100),
            treasury,
            tax: dec!(10),
            check_capacity,
        }
    }

    #[test]
    fn movement_splits_between_recipient_and_treasury() {
        let (wallets, payer, recipient, treasury) = setup(dec!(500));
        let result = wallets.apply(&movement(payer, recipient, treasury, true));
        assert!(result.is_ok());
        assert_eq!(wallets.balance(payer), Some(dec!(390)));
        assert_eq!(wallets.balance(recipient), Some(dec!(100)));
        assert_eq!(wallets.balance(treasury), Some(dec!(10)));
        assert_eq!(wallets.total_supply(), dec!(500));
    }

    #[test]
    fn insufficient_funds_leave_wallets_untouched() {
        let (wallets, payer, recipient, treasury) = setup(dec!(50));
        let result = wallets.apply(&movement(payer, recipient, treasury, true));
        assert!(matches!(
            result,
            Err(FinancialTransactionError::NotEnoughMoney { .. })
        ));
        assert_eq!(wallets.balance(payer), Some(dec!(50)));
        assert_eq!(wallets.balance(recipient), Some(Decimal::ZERO));
        assert_eq!(wallets.balance(treasury), Some(Decimal::ZERO));
    }

    #[test]
    fn unchecked_movement_may_overdraw() {
        let (wallets, payer, recipient, treasury) = setup(dec!(50));
        let result = wallets.apply(&movement(payer, recipient, treasury, false));
        assert!(result.is_ok());
        assert_eq!(wallets.balance(payer), Some(dec!(-60)));
    }

    #[test]
    fn unknown_wallet_rejected() {
        let (wallets, payer, _, treasury) = setup(dec!(500));
        let stranger = PlayerId::new();
        let result = wallets.apply(&movement(payer, stranger, treasury, true));
        assert_eq!(result, Err(FinancialTransactionError::WalletNotFound(stranger)));
        assert_eq!(wallets.balance(payer), Some(dec!(500)));
    }

    #[test]
    fn treasury_paying_itself_tax_nets_out() {
        let (wallets, _, recipient, treasury) = setup(Decimal::ZERO);
        wallets.open_wallet(treasury, dec!(200));
        let result = wallets.apply(&movement(treasury, recipient, treasury, true));
        assert!(result.is_ok());
        assert_eq!(wallets.balance(treasury), Some(dec!(100)));
        assert_eq!(wallets.balance(recipient), Some(dec!(100)));
    }
}
