//! Transaction builder and validation.
//!
//! Provides a [`TransactionBuilder`] that enforces the two-party invariant:
//! every transaction names a payer, a distinct recipient and an invoice with
//! non-negative amounts. Builders validate inputs before producing a
//! [`FinancialTransaction`].

use chrono::Utc;
use rust_decimal::Decimal;

use tycoon_types::{FinancialTransaction, Invoice, PlayerId, TransactionId, TransactionKind};

use crate::FinancialTransactionError;

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`FinancialTransaction`] values.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use tycoon_ledger::TransactionBuilder;
/// use tycoon_types::{Invoice, PlayerId, TransactionKind};
///
/// let transaction = TransactionBuilder::new(TransactionKind::Commission, 4)
///     .payer(PlayerId::new())
///     .recipient(PlayerId::new())
///     .invoice(Invoice::from_net("Commission", Decimal::new(150, 0), Decimal::new(23, 2)))
///     .build();
///
/// assert!(transaction.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    kind: TransactionKind,
    month: u32,
    payer: Option<PlayerId>,
    recipient: Option<PlayerId>,
    invoice: Option<Invoice>,
}

impl TransactionBuilder {
    /// Start building a transaction of the given kind for a game month.
    pub const fn new(kind: TransactionKind, month: u32) -> Self {
        Self {
            kind,
            month,
            payer: None,
            recipient: None,
            invoice: None,
        }
    }

    /// Set the payer (debited the invoice total).
    #[must_use]
    pub const fn payer(mut self, payer: PlayerId) -> Self {
        self.payer = Some(payer);
        self
    }

    /// Set the recipient (credited the invoice net value).
    #[must_use]
    pub const fn recipient(mut self, recipient: PlayerId) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Set the invoice being paid.
    #[must_use]
    pub fn invoice(mut self, invoice: Invoice) -> Self {
        self.invoice = Some(invoice);
        self
    }

    /// Validate inputs and produce a [`FinancialTransaction`].
    ///
    /// # Errors
    ///
    /// Returns [`FinancialTransactionError::MissingField`] if a field is not
    /// set, [`FinancialTransactionError::SamePayerAndRecipient`] if both
    /// sides are the same player and
    /// [`FinancialTransactionError::NegativeAmount`] if the invoice carries a
    /// negative net value or tax.
    pub fn build(self) -> Result<FinancialTransaction, FinancialTransactionError> {
        let payer_id = self.payer.ok_or(FinancialTransactionError::MissingField("payer"))?;
        let recipient_id = self
            .recipient
            .ok_or(FinancialTransactionError::MissingField("recipient"))?;
        let invoice = self
            .invoice
            .ok_or(FinancialTransactionError::MissingField("invoice"))?;

        if payer_id == recipient_id {
            return Err(FinancialTransactionError::SamePayerAndRecipient(payer_id));
        }
        validate_invoice(&invoice)?;

        Ok(FinancialTransaction {
            id: TransactionId::new(),
            payer_id,
            recipient_id,
            invoice,
            kind: self.kind,
            month: self.month,
            created_at: Utc::now(),
        })
    }
}

/// Reject invoices with negative amounts.
pub(crate) fn validate_invoice(invoice: &Invoice) -> Result<(), FinancialTransactionError> {
    for amount in [invoice.net_value(), invoice.tax()] {
        if amount < Decimal::ZERO {
            return Err(FinancialTransactionError::NegativeAmount { amount });
        }
    }
    Ok(())
}
