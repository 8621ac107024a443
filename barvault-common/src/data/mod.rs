pub mod contract;
pub mod errors;
pub mod meta;
pub mod store;
pub mod types;

pub use contract::{Contract, SecType, Symbol};
pub use errors::{DataError, DataResult};
pub use meta::Metadata;
pub use store::{clean, BarStore, WriteStamp};
pub use types::{Bar, BarSeries};
