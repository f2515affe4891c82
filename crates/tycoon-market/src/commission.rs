//! Real estate agency commission.
//!
//! The raw commission is a base fee per property kind plus a share of the
//! price. Above the threshold only a tenth of the excess is charged, which
//! keeps commissions on expensive buildings reasonable.

use rust_decimal::Decimal;

use tycoon_types::{Invoice, PropertyKind, mul_money, round_money};

use crate::config::CommissionConfig;

/// Tenth of the excess above the threshold.
const EXCESS_SHARE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Net commission for selling a property of `kind` at `net_price`.
pub fn commission_net_value(config: &CommissionConfig, kind: PropertyKind, net_price: Decimal) -> Decimal {
    let raw = round_money(
        config
            .base_fee(kind)
            .saturating_add(mul_money(net_price, config.rate)),
    );
    if raw <= config.threshold {
        return raw;
    }
    let excess = raw.saturating_sub(config.threshold);
    round_money(config.threshold.saturating_add(mul_money(excess, EXCESS_SHARE)))
}

/// Commission invoice, taxed at the services rate.
pub fn commission_invoice(
    config: &CommissionConfig,
    services_tax_rate: Decimal,
    kind: PropertyKind,
    net_price: Decimal,
) -> Invoice {
    Invoice::from_net(
        format!("Agency commission for {}", kind.display_name()),
        commission_net_value(config, kind, net_price),
        services_tax_rate,
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn config() -> CommissionConfig {
        CommissionConfig {
            rate: dec!(0.01),
            threshold: dec!(10_000),
            ..CommissionConfig::default()
        }
    }

    #[test]
    fn below_threshold_is_fee_plus_rate() {
        // 1_000 + 1% of 200_000
        assert_eq!(
            commission_net_value(&config(), PropertyKind::Land, dec!(200_000)),
            dec!(3_000)
        );
    }

    #[test]
    fn at_threshold_is_unchanged() {
        assert_eq!(
            commission_net_value(&config(), PropertyKind::Land, dec!(900_000)),
            dec!(10_000)
        );
    }

    #[test]
    fn excess_above_threshold_is_cut_to_a_tenth() {
        // raw = 3_000 + 1% of 2_000_000 = 23_000 -> 10_000 + 13_000 / 10
        assert_eq!(
            commission_net_value(&config(), PropertyKind::ResidentialBuilding, dec!(2_000_000)),
            dec!(11_300)
        );
    }

    #[test]
    fn base_fee_depends_on_kind() {
        let c = config();
        assert_eq!(commission_net_value(&c, PropertyKind::Road, Decimal::ZERO), dec!(100));
        assert_eq!(commission_net_value(&c, PropertyKind::Parking, Decimal::ZERO), dec!(1_500));
    }

    #[test]
    fn invoice_carries_services_tax() {
        let invoice = commission_invoice(&config(), dec!(0.23), PropertyKind::Land, dec!(100_000));
        assert_eq!(invoice.net_value(), dec!(2_000));
        assert_eq!(invoice.tax(), dec!(460));
        assert_eq!(invoice.total(), dec!(2_460));
    }
}
