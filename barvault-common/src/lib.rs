pub mod data;

pub use data::contract::{Contract, SecType, Symbol};
pub use data::errors::{DataError, DataResult};
pub use data::meta::Metadata;
pub use data::store::sqlite::VersionedBars;
pub use data::store::{clean, BarStore, BinaryStore, CsvStore, SqliteStore, WriteStamp};
pub use data::types::{Bar, BarSeries};
