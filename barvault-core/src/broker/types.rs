use rust_decimal::Decimal;

/// Authoritative contract details returned by the market-data connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDetails {
    pub long_name: String,
    /// Minimum price increment.
    pub min_tick: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Buy,
    Sell,
}

/// Hypothetical order submitted only to obtain a commission estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOrder {
    pub action: OrderAction,
    pub quantity: Decimal,
}

impl Default for ProbeOrder {
    fn default() -> Self {
        Self {
            action: OrderAction::Buy,
            quantity: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommissionEstimate {
    pub commission: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_order_defaults_to_buy_one() {
        let order = ProbeOrder::default();
        assert_eq!(order.action, OrderAction::Buy);
        assert_ne!(order.action, OrderAction::Sell);
        assert_eq!(order.quantity, Decimal::ONE);

        let exit = ProbeOrder {
            action: OrderAction::Sell,
            ..ProbeOrder::default()
        };
        assert_eq!(exit.action, OrderAction::Sell);
    }
}
