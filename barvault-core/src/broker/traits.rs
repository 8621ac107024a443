// broker/traits.rs

use async_trait::async_trait;
use barvault_common::Contract;

use crate::broker::errors::BrokerError;
use crate::broker::types::{CommissionEstimate, ContractDetails, ProbeOrder};

/// Live market-data connection, consumed by maintenance tooling only.
/// The datastore itself never depends on this.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Resolve partially specified contracts in place to fully qualified
    /// ones.
    async fn qualify_contracts(&self, contracts: &mut [Contract]) -> Result<(), BrokerError>;

    /// Authoritative details for a qualified contract.
    async fn contract_details(&self, contract: &Contract) -> Result<ContractDetails, BrokerError>;

    /// Commission estimate for a hypothetical order, without placing it.
    async fn what_if_order(
        &self,
        contract: &Contract,
        order: &ProbeOrder,
    ) -> Result<CommissionEstimate, BrokerError>;
}
