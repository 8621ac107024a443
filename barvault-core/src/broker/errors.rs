// broker/errors.rs

use thiserror::Error;

/// Error types for market-data connection operations
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid contract: {0}")]
    InvalidContract(String),

    #[error("Data parsing error: {0}")]
    Parse(String),
}
