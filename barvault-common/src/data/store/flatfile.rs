//! Flat-file table backend.
//!
//! One CSV file per library, one internal key per canonical symbol, located
//! under a caller-supplied base directory. The store never holds an open
//! handle: every operation acquires a fresh one and releases it on all exit
//! paths, trading per-call overhead for safety against stale handles across
//! process restarts.
//!
//! Writes append. Repeated writes for the same key accumulate rows rather
//! than overwrite, and duplicate removal is best-effort within a single
//! write only, so accumulated history across calls is NOT guaranteed
//! deduplicated unless the caller writes the whole cleaned superset each
//! time. Known structural limitation versus the versioned backend.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::contract::Symbol;
use crate::data::errors::{DataError, DataResult};
use crate::data::meta::Metadata;
use crate::data::store::{clean, normalize_library, BarStore, WriteStamp};
use crate::data::types::{Bar, BarSeries};

const BACKEND: &str = "flat-file";

/// On-disk row: a bar tagged with its canonical key.
#[derive(Debug, Serialize, Deserialize)]
struct FileRow {
    key: String,
    time: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
    wap: Option<Decimal>,
    count: Option<i64>,
}

impl FileRow {
    fn from_bar(key: &str, bar: &Bar) -> Self {
        Self {
            key: key.to_string(),
            time: bar.time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            wap: bar.wap,
            count: bar.count,
        }
    }

    fn into_bar(self) -> Bar {
        Bar {
            time: self.time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            wap: self.wap,
            count: self.count,
        }
    }
}

/// Append-only CSV table store keyed by canonical symbol.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Resolve the library file under `base`, creating the directory on
    /// first use. Library name spaces normalize to underscores.
    pub fn new(lib: &str, base: impl AsRef<Path>) -> DataResult<Self> {
        let lib = normalize_library(lib)?;
        fs::create_dir_all(base.as_ref())?;
        Ok(Self {
            path: base.as_ref().join(format!("{lib}.csv")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> DataResult<Vec<FileRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

#[async_trait]
impl BarStore for CsvStore {
    async fn write_with_meta(
        &self,
        symbol: &Symbol,
        bars: &BarSeries,
        extra: Metadata,
    ) -> DataResult<Option<WriteStamp>> {
        if !extra.is_empty() {
            debug!("Metadata ignored by the {} backend", BACKEND);
        }
        let key = symbol.key();
        let cleaned = clean(bars);

        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for bar in cleaned.bars() {
            writer.serialize(FileRow::from_bar(&key, bar))?;
        }
        writer.flush()?;

        debug!("Appended {} rows for {}", cleaned.len(), key);
        Ok(None)
    }

    async fn read(&self, symbol: &Symbol) -> DataResult<Option<BarSeries>> {
        let key = symbol.key();
        let bars: BarSeries = self
            .read_rows()?
            .into_iter()
            .filter(|row| row.key == key)
            .map(FileRow::into_bar)
            .collect();
        if bars.is_empty() {
            Ok(None)
        } else {
            Ok(Some(bars))
        }
    }

    async fn keys(&self) -> DataResult<Vec<String>> {
        let mut keys: Vec<String> = Vec::new();
        for row in self.read_rows()? {
            if !keys.contains(&row.key) {
                keys.push(row.key);
            }
        }
        Ok(keys)
    }

    async fn read_metadata(&self, _symbol: &Symbol) -> DataResult<Option<Metadata>> {
        Err(DataError::Unsupported {
            backend: BACKEND,
            operation: "read_metadata",
        })
    }

    async fn write_metadata(&self, _symbol: &Symbol, _fields: Metadata) -> DataResult<()> {
        Err(DataError::Unsupported {
            backend: BACKEND,
            operation: "write_metadata",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::contract::Contract;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn bar_at(hour: u32, close: Decimal) -> Bar {
        let time = Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap();
        Bar::new(time, close, close, close, close, dec!(250))
    }

    #[tokio::test]
    async fn sequential_writes_accumulate_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new("TRADES_30_secs", dir.path()).unwrap();
        let sym = Symbol::from("ESM6_FUT");

        let first = BarSeries::from(vec![bar_at(9, dec!(1)), bar_at(10, dec!(2))]);
        let second = BarSeries::from(vec![bar_at(11, dec!(3))]);
        store.write(&sym, &first).await.unwrap();
        store.write(&sym, &second).await.unwrap();

        // Append semantics: union of both frames, not the latest only.
        let read = store.read(&sym).await.unwrap().unwrap();
        assert_eq!(read.len(), 3);
        let times: Vec<_> = read.bars().iter().map(|b| b.time).collect();
        assert!(times.contains(&bar_at(9, dec!(1)).time));
        assert!(times.contains(&bar_at(11, dec!(3)).time));
    }

    #[tokio::test]
    async fn writes_are_cleaned_within_a_single_call_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new("TRADES_30_secs", dir.path()).unwrap();
        let sym = Symbol::from("ESM6_FUT");

        let dirty = BarSeries::from(vec![bar_at(9, dec!(1)), bar_at(9, dec!(2))]);
        store.write(&sym, &dirty).await.unwrap();
        assert_eq!(store.read(&sym).await.unwrap().unwrap().len(), 1);

        // A second write of the same timestamp accumulates: no cross-call
        // deduplication.
        store.write(&sym, &dirty).await.unwrap();
        assert_eq!(store.read(&sym).await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn absent_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new("TRADES_30_secs", dir.path()).unwrap();
        let sym = Symbol::from("MISSING_STK");

        assert!(store.read(&sym).await.unwrap().is_none());
        assert_eq!(store.check_earliest(&sym).await.unwrap(), None);
        assert_eq!(store.check_latest(&sym).await.unwrap(), None);
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn library_name_with_spaces_maps_to_underscored_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new("BID ASK", dir.path()).unwrap();
        let contract = Contract::future("ES", "ESM6", "20260618");
        store
            .write(
                &Symbol::from(contract),
                &BarSeries::from(vec![bar_at(9, dec!(1))]),
            )
            .await
            .unwrap();

        assert!(dir.path().join("BID_ASK.csv").exists());
        assert_eq!(store.keys().await.unwrap(), vec!["ESM6_FUT"]);
    }

    #[tokio::test]
    async fn keys_are_distinct_in_first_appearance_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new("TRADES_30_secs", dir.path()).unwrap();
        let series = BarSeries::from(vec![bar_at(9, dec!(1))]);

        store.write(&Symbol::from("B_KEY"), &series).await.unwrap();
        store.write(&Symbol::from("A_KEY"), &series).await.unwrap();
        store.write(&Symbol::from("B_KEY"), &series).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["B_KEY", "A_KEY"]);
    }

    #[tokio::test]
    async fn metadata_operations_fail_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new("TRADES_30_secs", dir.path()).unwrap();
        let sym = Symbol::from("ESM6_FUT");

        assert!(matches!(
            store.read_metadata(&sym).await,
            Err(DataError::Unsupported { .. })
        ));
        assert!(matches!(
            store.write_metadata(&sym, Metadata::new()).await,
            Err(DataError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn optional_bar_fields_survive_the_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new("TRADES_30_secs", dir.path()).unwrap();
        let sym = Symbol::from("ESM6_FUT");

        let mut bar = bar_at(9, dec!(1));
        bar.wap = Some(dec!(1.5));
        bar.count = Some(42);
        let plain = bar_at(10, dec!(2));
        store
            .write(&sym, &BarSeries::from(vec![bar.clone(), plain.clone()]))
            .await
            .unwrap();

        let read = store.read(&sym).await.unwrap().unwrap();
        assert_eq!(read.bars()[0], bar);
        assert_eq!(read.bars()[1], plain);
    }
}
