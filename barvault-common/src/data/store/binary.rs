//! Placeholder backend reserving the contract slot for a future
//! binary-snapshot store. Construction works; every operation fails with an
//! unsupported-capability error rather than silently doing nothing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::data::contract::Symbol;
use crate::data::errors::{DataError, DataResult};
use crate::data::meta::Metadata;
use crate::data::store::{normalize_library, BarStore, WriteStamp};
use crate::data::types::BarSeries;

const BACKEND: &str = "binary";

fn unsupported(operation: &'static str) -> DataError {
    DataError::Unsupported {
        backend: BACKEND,
        operation,
    }
}

pub struct BinaryStore {
    lib: String,
    base: PathBuf,
}

impl BinaryStore {
    pub fn new(lib: &str, base: impl AsRef<Path>) -> DataResult<Self> {
        Ok(Self {
            lib: normalize_library(lib)?,
            base: base.as_ref().to_path_buf(),
        })
    }

    pub fn library(&self) -> &str {
        &self.lib
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

#[async_trait]
impl BarStore for BinaryStore {
    async fn write_with_meta(
        &self,
        _symbol: &Symbol,
        _bars: &BarSeries,
        _extra: Metadata,
    ) -> DataResult<Option<WriteStamp>> {
        Err(unsupported("write"))
    }

    async fn read(&self, _symbol: &Symbol) -> DataResult<Option<BarSeries>> {
        Err(unsupported("read"))
    }

    async fn keys(&self) -> DataResult<Vec<String>> {
        Err(unsupported("keys"))
    }

    async fn read_metadata(&self, _symbol: &Symbol) -> DataResult<Option<Metadata>> {
        Err(unsupported("read_metadata"))
    }

    async fn write_metadata(&self, _symbol: &Symbol, _fields: Metadata) -> DataResult<()> {
        Err(unsupported("write_metadata"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_operation_fails_loudly() {
        let store = BinaryStore::new("TRADES 30 secs", "/tmp/unused").unwrap();
        assert_eq!(store.library(), "TRADES_30_secs");
        assert_eq!(store.base(), Path::new("/tmp/unused"));

        let sym = Symbol::from("ESM6_FUT");
        assert!(matches!(
            store.read(&sym).await,
            Err(DataError::Unsupported { .. })
        ));
        assert!(matches!(
            store.write(&sym, &BarSeries::new()).await,
            Err(DataError::Unsupported { .. })
        ));
        assert!(matches!(
            store.keys().await,
            Err(DataError::Unsupported { .. })
        ));
    }
}
