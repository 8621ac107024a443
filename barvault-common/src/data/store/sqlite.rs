//! Versioned-document backend over SQLite.
//!
//! One logical library per (whatToShow, barSize) pair, one table per
//! library. Every write persists a new version of the key; reads return the
//! latest version. The pool is capped at a single connection: the store
//! contract is single-threaded and a shared handle must not be used
//! concurrently without external locking.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::data::contract::Symbol;
use crate::data::errors::{DataError, DataResult};
use crate::data::meta::Metadata;
use crate::data::store::{clean, normalize_library, BarStore, WriteStamp};
use crate::data::types::BarSeries;

use async_trait::async_trait;

/// Full stored record for a key: latest bars plus the version envelope.
#[derive(Debug, Clone)]
pub struct VersionedBars {
    pub bars: BarSeries,
    pub symbol: String,
    pub version: i64,
    pub written_at: DateTime<Utc>,
    pub metadata: Metadata,
}

/// Multi-version document store keyed by canonical symbol.
pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    /// Open or lazily create the named library at `url`.
    ///
    /// Library name is whatToShow + barSize, e.g. `TRADES_1_min`,
    /// `BID_ASK 1 hour` (spaces normalized to underscores).
    pub async fn connect(lib: &str, url: &str) -> DataResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(DataError::Database)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(lib, pool).await
    }

    /// Bind the named library to an existing pool.
    pub async fn with_pool(lib: &str, pool: SqlitePool) -> DataResult<Self> {
        let table = normalize_library(lib)?;
        let store = Self { pool, table };
        store.ensure_table().await?;
        Ok(store)
    }

    pub fn library(&self) -> &str {
        &self.table
    }

    async fn ensure_table(&self) -> DataResult<()> {
        // Table name comes from normalize_library, alphanumeric + underscore
        // only.
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                symbol TEXT NOT NULL,
                version INTEGER NOT NULL,
                written_at TEXT NOT NULL,
                data TEXT NOT NULL,
                metadata TEXT NOT NULL,
                PRIMARY KEY (symbol, version)
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_row(&self, key: &str) -> DataResult<Option<sqlx::sqlite::SqliteRow>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT symbol, version, written_at, data, metadata
            FROM "{}" WHERE symbol = ?
            ORDER BY version DESC LIMIT 1
            "#,
            self.table
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Like `read` but returns the full versioned record (bars + version +
    /// metadata); `Ok(None)` on absence, malformed rows included.
    pub async fn read_object(&self, symbol: &Symbol) -> DataResult<Option<VersionedBars>> {
        let key = symbol.key();
        let Some(row) = self.latest_row(&key).await? else {
            return Ok(None);
        };

        let data: String = row.try_get("data")?;
        let meta: String = row.try_get("metadata")?;
        let (bars, metadata) = match (
            serde_json::from_str::<BarSeries>(&data),
            serde_json::from_str::<Metadata>(&meta),
        ) {
            (Ok(bars), Ok(metadata)) => (bars, metadata),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Malformed record for {}: {}", key, e);
                return Ok(None);
            }
        };

        Ok(Some(VersionedBars {
            bars,
            symbol: row.try_get("symbol")?,
            version: row.try_get("version")?,
            written_at: row.try_get("written_at")?,
            metadata,
        }))
    }
}

#[async_trait]
impl BarStore for SqliteStore {
    async fn write_with_meta(
        &self,
        symbol: &Symbol,
        bars: &BarSeries,
        extra: Metadata,
    ) -> DataResult<Option<WriteStamp>> {
        let key = symbol.key();
        let mut metadata = Metadata::for_symbol(symbol);
        metadata.merge(extra);

        let cleaned = clean(bars);
        let data_json = serde_json::to_string(&cleaned)?;
        let meta_json = serde_json::to_string(&metadata)?;
        let written_at = Utc::now();

        let row = sqlx::query(&format!(
            r#"SELECT COALESCE(MAX(version), 0) AS v FROM "{}" WHERE symbol = ?"#,
            self.table
        ))
        .bind(&key)
        .fetch_one(&self.pool)
        .await?;
        let version: i64 = row.try_get::<i64, _>("v")? + 1;

        sqlx::query(&format!(
            r#"
            INSERT INTO "{}" (symbol, version, written_at, data, metadata)
            VALUES (?, ?, ?, ?, ?)
            "#,
            self.table
        ))
        .bind(&key)
        .bind(version)
        .bind(written_at)
        .bind(&data_json)
        .bind(&meta_json)
        .execute(&self.pool)
        .await?;

        debug!(
            "Wrote {} rows for {} as version {} in {}",
            cleaned.len(),
            key,
            version,
            self.table
        );

        Ok(Some(WriteStamp {
            symbol: key,
            version,
            written_at,
            metadata,
        }))
    }

    async fn read(&self, symbol: &Symbol) -> DataResult<Option<BarSeries>> {
        Ok(self.read_object(symbol).await?.map(|obj| obj.bars))
    }

    async fn keys(&self) -> DataResult<Vec<String>> {
        let rows = sqlx::query(&format!(r#"SELECT DISTINCT symbol FROM "{}""#, self.table))
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("symbol").map_err(DataError::from))
            .collect()
    }

    async fn read_metadata(&self, symbol: &Symbol) -> DataResult<Option<Metadata>> {
        let key = symbol.key();
        let Some(row) = self.latest_row(&key).await? else {
            return Ok(None);
        };
        let meta: String = row.try_get("metadata")?;
        match serde_json::from_str(&meta) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) => {
                warn!("Malformed metadata for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn write_metadata(&self, symbol: &Symbol, fields: Metadata) -> DataResult<()> {
        let key = symbol.key();
        let Some(row) = self.latest_row(&key).await? else {
            return Err(DataError::NotFound(key));
        };
        let version: i64 = row.try_get("version")?;
        let stored: String = row.try_get("metadata")?;
        let mut metadata: Metadata = serde_json::from_str(&stored).unwrap_or_default();
        metadata.merge(fields);

        sqlx::query(&format!(
            r#"UPDATE "{}" SET metadata = ? WHERE symbol = ? AND version = ?"#,
            self.table
        ))
        .bind(serde_json::to_string(&metadata)?)
        .bind(&key)
        .bind(version)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
