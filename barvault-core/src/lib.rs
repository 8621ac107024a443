pub mod broker;
pub mod config;
pub mod errors;
pub mod maintenance;
pub mod paths;

pub use broker::{
    BrokerError, CommissionEstimate, ContractDetails, MarketData, OrderAction, ProbeOrder,
};
pub use config::Settings;
pub use errors::ServiceError;
pub use maintenance::{update_details, RefreshReport};
pub use paths::default_path;
