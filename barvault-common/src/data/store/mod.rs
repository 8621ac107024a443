//! The datastore abstraction: one polymorphic contract, interchangeable
//! backends.
//!
//! Callers depend only on [`BarStore`]; adding a backend never touches call
//! sites. The write path canonicalizes the symbol, derives metadata and runs
//! the cleaning pass; the read path hands back stored rows untouched.

pub mod binary;
pub mod flatfile;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::contract::Symbol;
use crate::data::errors::{DataError, DataResult};
use crate::data::meta::Metadata;
use crate::data::types::BarSeries;

pub use binary::BinaryStore;
pub use flatfile::CsvStore;
pub use sqlite::SqliteStore;

/// Write-time normalization: sort ascending by timestamp, then drop rows
/// whose timestamp duplicates an earlier post-sort row (first one wins).
/// Idempotent.
pub fn clean(series: &BarSeries) -> BarSeries {
    let mut cleaned = series.clone();
    cleaned.sort_ascending();
    cleaned.dedup_by_time();
    cleaned
}

/// Library names select a storage unit per (whatToShow, barSize) pair, e.g.
/// `TRADES_30_secs`. Spaces are normalized to underscores here, at
/// construction time; keys are never rewritten.
pub(crate) fn normalize_library(lib: &str) -> DataResult<String> {
    let lib = lib.replace(' ', "_");
    if lib.is_empty() {
        return Err(DataError::InvalidLibrary("empty library name".to_string()));
    }
    // Library names end up as table names and file names.
    if !lib.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DataError::InvalidLibrary(lib));
    }
    Ok(lib)
}

/// Envelope returned by versioned backends on write: the version id and
/// timestamp the backend assigned, plus the final merged metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteStamp {
    pub symbol: String,
    pub version: i64,
    pub written_at: DateTime<Utc>,
    pub metadata: Metadata,
}

/// Polymorphic contract over the capability set {write, read, keys} plus the
/// metadata operations, implemented by every backend.
///
/// `check_earliest`/`check_latest` are convenience queries built only on top
/// of `read`. They translate missing keys and malformed stored values into
/// `Ok(None)` so that callers probing many candidate keys (backfill planning)
/// never need failure handling; other backend errors propagate unmodified.
#[async_trait]
pub trait BarStore: Send + Sync {
    /// Persist `bars` under the symbol's canonical key with caller metadata
    /// fields merged over the derived record. Versioned backends return a
    /// [`WriteStamp`]; others return `None`.
    async fn write_with_meta(
        &self,
        symbol: &Symbol,
        bars: &BarSeries,
        extra: Metadata,
    ) -> DataResult<Option<WriteStamp>>;

    /// The stored dataset for the symbol's key, `Ok(None)` when absent.
    async fn read(&self, symbol: &Symbol) -> DataResult<Option<BarSeries>>;

    /// All canonical keys currently present, in backend-native order.
    async fn keys(&self) -> DataResult<Vec<String>>;

    /// Metadata of the latest stored record, `Ok(None)` when absent.
    async fn read_metadata(&self, symbol: &Symbol) -> DataResult<Option<Metadata>>;

    /// Merge `fields` over the stored metadata without touching bar data.
    async fn write_metadata(&self, symbol: &Symbol, fields: Metadata) -> DataResult<()>;

    /// Like [`BarStore::write_with_meta`] with a freshly constructed empty
    /// override record.
    async fn write(&self, symbol: &Symbol, bars: &BarSeries) -> DataResult<Option<WriteStamp>> {
        self.write_with_meta(symbol, bars, Metadata::new()).await
    }

    /// Minimum stored timestamp for the symbol, `Ok(None)` when the key is
    /// absent or the stored value has no usable index.
    async fn check_earliest(&self, symbol: &Symbol) -> DataResult<Option<DateTime<Utc>>> {
        match self.read(symbol).await {
            Ok(series) => Ok(series.and_then(|s| s.earliest())),
            Err(DataError::NotFound(_)) | Err(DataError::MalformedRecord(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Maximum stored timestamp for the symbol, same absence policy as
    /// [`BarStore::check_earliest`].
    async fn check_latest(&self, symbol: &Symbol) -> DataResult<Option<DateTime<Utc>>> {
        match self.read(symbol).await {
            Ok(series) => Ok(series.and_then(|s| s.latest())),
            Err(DataError::NotFound(_)) | Err(DataError::MalformedRecord(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
