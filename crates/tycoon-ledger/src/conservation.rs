//! Money conservation audit for the ledger journal.
//!
//! Money never appears or vanishes inside the ledger. For every processed
//! transaction the payer debit equals the recipient credit plus the tax
//! sent to the treasury. Summed over a month:
//!
//! ```text
//! sum(invoice.total) == sum(invoice.net_value) + sum(invoice.tax)
//! ```
//!
//! Invoices are built so this holds by construction; the audit exists to
//! catch corrupted journal rows loaded from storage.

use rust_decimal::Decimal;

use tycoon_types::FinancialTransaction;

use crate::LedgerAnomaly;

/// The result of a conservation audit for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Debits match credits plus tax.
    Balanced,
    /// The month does not balance.
    Anomaly(LedgerAnomaly),
}

/// Audit every journal entry belonging to `month`.
pub fn verify_conservation(month: u32, entries: &[FinancialTransaction]) -> ConservationResult {
    let mut debited = Decimal::ZERO;
    let mut credited = Decimal::ZERO;
    let mut taxed = Decimal::ZERO;

    for entry in entries.iter().filter(|e| e.month == month) {
        let invoice = &entry.invoice;
        let sums = (
            debited.checked_add(invoice.total()),
            credited.checked_add(invoice.net_value()),
            taxed.checked_add(invoice.tax()),
        );
        let (Some(d), Some(c), Some(t)) = sums else {
            return overflow_anomaly(month);
        };
        debited = d;
        credited = c;
        taxed = t;
    }

    let Some(outflow) = credited.checked_add(taxed) else {
        return overflow_anomaly(month);
    };

    if debited == outflow {
        ConservationResult::Balanced
    } else {
        ConservationResult::Anomaly(LedgerAnomaly {
            month,
            debited,
            credited,
            taxed,
            message: format!(
                "LEDGER_ANOMALY in month {month}: debited {debited}, credited {credited} plus tax {taxed}",
            ),
        })
    }
}

/// Tax collected by the treasury in a month.
pub fn treasury_intake(month: u32, entries: &[FinancialTransaction]) -> Decimal {
    entries
        .iter()
        .filter(|e| e.month == month)
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.invoice.tax()))
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(month: u32) -> ConservationResult {
    ConservationResult::Anomaly(LedgerAnomaly {
        month,
        debited: Decimal::ZERO,
        credited: Decimal::ZERO,
        taxed: Decimal::ZERO,
        message: format!("LEDGER_ANOMALY in month {month}: arithmetic overflow during summation"),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tycoon_types::{Invoice, PlayerId, TransactionId, TransactionKind};

    use super::*;

    fn entry(month: u32, invoice: Invoice) -> FinancialTransaction {
        FinancialTransaction {
            id: TransactionId::new(),
            payer_id: PlayerId::new(),
            recipient_id: PlayerId::new(),
            invoice,
            kind: TransactionKind::Other,
            month,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_month_is_balanced() {
        assert_eq!(verify_conservation(1, &[]), ConservationResult::Balanced);
    }

    #[test]
    fn well_formed_invoices_balance() {
        let entries = vec![
            entry(1, Invoice::from_net("A", dec!(333), dec!(0.23))),
            entry(1, Invoice::from_total("B", dec!(1_001), dec!(0.08))),
            entry(2, Invoice::from_net("C", dec!(10), dec!(0.5))),
        ];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
        assert_eq!(treasury_intake(2, &entries), dec!(5));
    }

    #[test]
    fn tampered_row_is_flagged() {
        // A storage row whose total was rewritten after the fact.
        let honest = serde_json::to_value(Invoice::from_net("X", dec!(100), dec!(0.1)));
        assert!(honest.is_ok());
        let mut value = honest.unwrap_or_default();
        value["total"] = serde_json::Value::String("150".to_owned());
        let forged: Result<Invoice, _> = serde_json::from_value(value);
        assert!(forged.is_ok());

        if let Ok(invoice) = forged {
            let result = verify_conservation(4, &[entry(4, invoice)]);
            assert!(matches!(result, ConservationResult::Anomaly(a) if a.debited == dec!(150)));
        }
    }
}
