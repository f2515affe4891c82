//! The ledger: processes taxed two-party transactions against wallets.
//!
//! # Design
//!
//! - **Tax to treasury**: the payer pays the invoice total, the recipient
//!   receives the net value, the treasury receives the tax.
//! - **Atomic**: each transaction changes all wallets or none.
//! - **Journal**: every applied transaction is appended, in order.
//! - **Precision**: all amounts are whole-unit [`Decimal`] values.

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use tracing::{debug, info};

use tycoon_types::{FinancialTransaction, Invoice, PlayerId, TransactionKind, mul_money};

use crate::conservation::{ConservationResult, treasury_intake, verify_conservation};
use crate::transaction::validate_invoice;
use crate::wallet::{WalletMovement, WalletStore};
use crate::{FinancialTransactionError, TransactionBuilder};

/// Title used on refund invoices.
const INCOME_TAX_REFUND_TITLE: &str = "Income tax refund";

/// Processes transactions and keeps the journal.
pub struct Ledger {
    /// Balance storage.
    wallets: Arc<dyn WalletStore>,
    /// Account receiving tax and paying refunds.
    treasury: PlayerId,
    /// Income tax rate used for refunds.
    income_tax_rate: Decimal,
    /// Applied transactions, in processing order.
    journal: Mutex<Vec<FinancialTransaction>>,
}

impl core::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger")
            .field("treasury", &self.treasury)
            .field("income_tax_rate", &self.income_tax_rate)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create a ledger over a wallet store.
    pub const fn new(wallets: Arc<dyn WalletStore>, treasury: PlayerId, income_tax_rate: Decimal) -> Self {
        Self {
            wallets,
            treasury,
            income_tax_rate,
            journal: Mutex::new(Vec::new()),
        }
    }

    /// The treasury account.
    pub const fn treasury(&self) -> PlayerId {
        self.treasury
    }

    /// Current balance of a player.
    pub fn balance(&self, player: PlayerId) -> Option<Decimal> {
        self.wallets.balance(player)
    }

    /// Process a transaction.
    ///
    /// Debits the payer `invoice.total`, credits the recipient
    /// `invoice.net_value` and the treasury `invoice.tax`. With
    /// `check_capacity` the payer must hold at least the total; without it
    /// (fines, seizures) the payer may end up negative.
    ///
    /// # Errors
    ///
    /// Returns [`FinancialTransactionError::NotEnoughMoney`] when the payer
    /// cannot cover the total, or any other [`FinancialTransactionError`]
    /// raised by validation or the wallet store. No wallet changes on error.
    pub fn process(
        &self,
        transaction: &FinancialTransaction,
        check_capacity: bool,
    ) -> Result<(), FinancialTransactionError> {
        validate_invoice(&transaction.invoice)?;
        let invoice = &transaction.invoice;

        let movement = WalletMovement {
            payer: transaction.payer_id,
            debit: invoice.total(),
            recipient: transaction.recipient_id,
            credit: invoice.net_value(),
            treasury: self.treasury,
            tax: invoice.tax(),
            check_capacity,
        };

        if let Err(e) = self.wallets.apply(&movement) {
            debug!(
                transaction = %transaction.id,
                payer = %transaction.payer_id,
                total = %invoice.total(),
                error = %e,
                "Transaction rejected"
            );
            return Err(e);
        }

        info!(
            transaction = %transaction.id,
            kind = ?transaction.kind,
            payer = %transaction.payer_id,
            recipient = %transaction.recipient_id,
            net = %invoice.net_value(),
            tax = %invoice.tax(),
            title = invoice.title(),
            "Transaction processed"
        );

        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(transaction.clone());
        Ok(())
    }

    /// Refund part of the income tax on a sale that made a profit.
    ///
    /// When the seller's net proceeds exceed `costs` (purchase price plus
    /// investments), the treasury pays the seller
    /// `round((net - costs) * income_tax_rate)`. Returns the refunded amount,
    /// or `None` when nothing is due.
    ///
    /// # Errors
    ///
    /// Returns a [`FinancialTransactionError`] when the refund transaction
    /// cannot be built or processed. Callers treat this as non-blocking.
    pub fn refund_income_tax(
        &self,
        sale: &FinancialTransaction,
        costs: Decimal,
    ) -> Result<Option<Decimal>, FinancialTransactionError> {
        let proceeds = sale.invoice.net_value();
        if proceeds <= costs {
            return Ok(None);
        }
        let excess = proceeds
            .checked_sub(costs)
            .ok_or(FinancialTransactionError::ArithmeticOverflow)?;
        let refund = mul_money(excess, self.income_tax_rate);
        if refund <= Decimal::ZERO {
            return Ok(None);
        }

        let transaction = TransactionBuilder::new(TransactionKind::IncomeTaxRefund, sale.month)
            .payer(self.treasury)
            .recipient(sale.recipient_id)
            .invoice(Invoice::from_net(INCOME_TAX_REFUND_TITLE, refund, Decimal::ZERO))
            .build()?;
        self.process(&transaction, true)?;
        Ok(Some(refund))
    }

    /// Snapshot of every applied transaction, in order.
    pub fn journal(&self) -> Vec<FinancialTransaction> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applied transactions where the player paid or received money.
    pub fn transactions_of(&self, player: PlayerId) -> Vec<FinancialTransaction> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| t.payer_id == player || t.recipient_id == player)
            .cloned()
            .collect()
    }

    /// Tax collected by the treasury in a month.
    pub fn treasury_intake(&self, month: u32) -> Decimal {
        let journal = self.journal.lock().unwrap_or_else(PoisonError::into_inner);
        treasury_intake(month, &journal)
    }

    /// Audit the journal for a month.
    pub fn verify_conservation(&self, month: u32) -> ConservationResult {
        let journal = self.journal.lock().unwrap_or_else(PoisonError::into_inner);
        verify_conservation(month, &journal)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::wallet::InMemoryWallets;

    struct Fixture {
        wallets: Arc<InMemoryWallets>,
        ledger: Ledger,
        treasury: PlayerId,
        buyer: PlayerId,
        seller: PlayerId,
    }

    fn fixture(buyer_balance: Decimal) -> Fixture {
        let wallets = Arc::new(InMemoryWallets::new());
        let treasury = PlayerId::new();
        let buyer = PlayerId::new();
        let seller = PlayerId::new();
        wallets.open_wallet(treasury, dec!(10_000));
        wallets.open_wallet(buyer, buyer_balance);
        wallets.open_wallet(seller, Decimal::ZERO);
        let ledger = Ledger::new(wallets.clone(), treasury, dec!(0.19));
        Fixture {
            wallets,
            ledger,
            treasury,
            buyer,
            seller,
        }
    }

    fn sale(f: &Fixture, net: Decimal, rate: Decimal) -> Option<FinancialTransaction> {
        TransactionBuilder::new(TransactionKind::PropertyPurchase, 2)
            .payer(f.buyer)
            .recipient(f.seller)
            .invoice(Invoice::from_net("Land", net, rate))
            .build()
            .ok()
    }

    #[test]
    fn tax_goes_to_treasury_not_recipient() {
        let f = fixture(dec!(5_000));
        let tx = sale(&f, dec!(1_000), dec!(0.23));
        assert!(tx.is_some());
        if let Some(tx) = tx {
            assert!(f.ledger.process(&tx, true).is_ok());
        }
        assert_eq!(f.ledger.balance(f.buyer), Some(dec!(3_770)));
        assert_eq!(f.ledger.balance(f.seller), Some(dec!(1_000)));
        assert_eq!(f.ledger.balance(f.treasury), Some(dec!(10_230)));
        assert_eq!(f.ledger.journal().len(), 1);
    }

    #[test]
    fn not_enough_money_mutates_nothing() {
        let f = fixture(dec!(1_100));
        let supply = f.wallets.total_supply();
        if let Some(tx) = sale(&f, dec!(1_000), dec!(0.23)) {
            let result = f.ledger.process(&tx, true);
            assert!(matches!(
                result,
                Err(FinancialTransactionError::NotEnoughMoney { .. })
            ));
        }
        assert_eq!(f.ledger.balance(f.buyer), Some(dec!(1_100)));
        assert_eq!(f.ledger.balance(f.seller), Some(Decimal::ZERO));
        assert_eq!(f.wallets.total_supply(), supply);
        assert!(f.ledger.journal().is_empty());
    }

    #[test]
    fn fines_may_overdraw() {
        let f = fixture(dec!(100));
        if let Some(tx) = sale(&f, dec!(1_000), Decimal::ZERO) {
            assert!(f.ledger.process(&tx, false).is_ok());
        }
        assert_eq!(f.ledger.balance(f.buyer), Some(dec!(-900)));
    }

    #[test]
    fn refund_on_profitable_sale() {
        let f = fixture(dec!(5_000));
        let Some(tx) = sale(&f, dec!(2_000), Decimal::ZERO) else {
            return;
        };
        assert!(f.ledger.process(&tx, true).is_ok());

        let refund = f.ledger.refund_income_tax(&tx, dec!(1_500));
        // (2000 - 1500) * 0.19 = 95
        assert_eq!(refund, Ok(Some(dec!(95))));
        assert_eq!(f.ledger.balance(f.seller), Some(dec!(2_095)));
        assert_eq!(f.ledger.balance(f.treasury), Some(dec!(9_905)));
        assert_eq!(f.ledger.transactions_of(f.seller).len(), 2);
    }

    #[test]
    fn no_refund_on_loss() {
        let f = fixture(dec!(5_000));
        let Some(tx) = sale(&f, dec!(1_000), Decimal::ZERO) else {
            return;
        };
        assert_eq!(f.ledger.refund_income_tax(&tx, dec!(1_000)), Ok(None));
        assert_eq!(f.ledger.refund_income_tax(&tx, dec!(4_000)), Ok(None));
    }

    #[test]
    fn refund_fails_when_treasury_is_empty() {
        let f = fixture(dec!(5_000));
        f.wallets.open_wallet(f.treasury, Decimal::ZERO);
        let Some(tx) = sale(&f, dec!(2_000), Decimal::ZERO) else {
            return;
        };
        let result = f.ledger.refund_income_tax(&tx, Decimal::ZERO);
        assert!(matches!(
            result,
            Err(FinancialTransactionError::NotEnoughMoney { .. })
        ));
    }

    #[test]
    fn processed_month_is_balanced() {
        let f = fixture(dec!(5_000));
        if let Some(tx) = sale(&f, dec!(999), dec!(0.23)) {
            assert!(f.ledger.process(&tx, true).is_ok());
        }
        assert_eq!(f.ledger.verify_conservation(2), ConservationResult::Balanced);
        assert_eq!(f.ledger.treasury_intake(2), dec!(230));
    }
}
