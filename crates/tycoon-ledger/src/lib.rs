//! Wallets and taxed two-party money movement for the Tycoon economy core.
//!
//! Every currency unit moving between players goes through this crate.
//! A transaction debits the payer the invoice total, credits the recipient
//! the invoice net value and routes the tax to the treasury account. The
//! recipient never sees the tax; callers build sale and commission invoices
//! relying on that split.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`]: processing, income tax refunds, journal.
//! - [`transaction`] -- The [`TransactionBuilder`] for validated transactions.
//! - [`wallet`] -- The [`WalletStore`] seam and [`InMemoryWallets`].
//! - [`conservation`] -- Money conservation audit over the journal.
//!
//! # Conservation Law
//!
//! For every processed transaction:
//!
//! ```text
//! payer debit == recipient credit + treasury tax
//! ```
//!
//! so the total money supply never changes through the ledger.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use rust_decimal::Decimal;
//! use tycoon_ledger::{InMemoryWallets, Ledger, TransactionBuilder, WalletStore};
//! use tycoon_types::{Invoice, PlayerId, TransactionKind};
//!
//! let treasury = PlayerId::new();
//! let buyer = PlayerId::new();
//! let seller = PlayerId::new();
//!
//! let wallets = Arc::new(InMemoryWallets::new());
//! wallets.open_wallet(treasury, Decimal::ZERO);
//! wallets.open_wallet(buyer, Decimal::new(2_000, 0));
//! wallets.open_wallet(seller, Decimal::ZERO);
//!
//! let ledger = Ledger::new(wallets.clone(), treasury, Decimal::new(19, 2));
//! let transaction = TransactionBuilder::new(TransactionKind::PropertyPurchase, 1)
//!     .payer(buyer)
//!     .recipient(seller)
//!     .invoice(Invoice::from_net("Land", Decimal::new(1_000, 0), Decimal::new(10, 2)))
//!     .build();
//!
//! if let Ok(transaction) = transaction {
//!     assert!(ledger.process(&transaction, true).is_ok());
//! }
//! assert_eq!(wallets.balance(seller), Some(Decimal::new(1_000, 0)));
//! assert_eq!(wallets.balance(treasury), Some(Decimal::new(100, 0)));
//! ```

pub mod conservation;
pub mod ledger;
pub mod transaction;
pub mod wallet;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use ledger::Ledger;
pub use transaction::TransactionBuilder;
pub use wallet::{InMemoryWallets, WalletMovement, WalletStore};

use rust_decimal::Decimal;

use tycoon_types::PlayerId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when building or processing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FinancialTransactionError {
    /// The payer cannot cover the invoice total.
    #[error("not enough money: {payer} has {balance}, needs {required}")]
    NotEnoughMoney {
        /// The payer.
        payer: PlayerId,
        /// Balance before the transaction.
        balance: Decimal,
        /// Invoice total.
        required: Decimal,
    },

    /// A participant has no wallet.
    #[error("wallet not found for player {0}")]
    WalletNotFound(PlayerId),

    /// Invoice amounts must not be negative.
    #[error("transaction amount must not be negative, got {amount}")]
    NegativeAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// A player cannot pay themselves.
    #[error("payer and recipient are the same player {0}")]
    SamePayerAndRecipient(PlayerId),

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Balance arithmetic overflowed.
    #[error("arithmetic overflow while moving money")]
    ArithmeticOverflow,

    /// The wallet store could not be accessed.
    #[error("wallet store unavailable: {0}")]
    StoreUnavailable(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation found by the journal audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The month that failed the audit.
    pub month: u32,
    /// Sum of payer debits.
    pub debited: Decimal,
    /// Sum of recipient credits.
    pub credited: Decimal,
    /// Sum of treasury tax.
    pub taxed: Decimal,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
