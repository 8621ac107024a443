pub mod errors;
pub mod traits;
pub mod types;

pub use errors::BrokerError;
pub use traits::MarketData;
pub use types::{CommissionEstimate, ContractDetails, OrderAction, ProbeOrder};
