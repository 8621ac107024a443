//! Time-series bar types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Volume-weighted average price, when the data source provides it.
    #[serde(default)]
    pub wap: Option<Decimal>,
    /// Number of trades aggregated into the bar.
    #[serde(default)]
    pub count: Option<i64>,
}

impl Bar {
    pub fn new(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            wap: None,
            count: None,
        }
    }
}

/// A timestamp-indexed dataset of bars.
///
/// The write path normalizes a series (ascending, unique timestamps) via
/// [`crate::data::store::clean`]; the read path returns stored rows as-is
/// without re-validating that invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarSeries(Vec<Bar>);

impl BarSeries {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, bar: Bar) {
        self.0.push(bar);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.0
    }

    /// Minimum timestamp in the series, `None` when empty.
    pub fn earliest(&self) -> Option<DateTime<Utc>> {
        self.0.iter().map(|b| b.time).min()
    }

    /// Maximum timestamp in the series, `None` when empty.
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.0.iter().map(|b| b.time).max()
    }

    pub(crate) fn sort_ascending(&mut self) {
        self.0.sort_by_key(|b| b.time);
    }

    pub(crate) fn dedup_by_time(&mut self) {
        self.0.dedup_by_key(|b| b.time);
    }
}

impl From<Vec<Bar>> for BarSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self(bars)
    }
}

impl FromIterator<Bar> for BarSeries {
    fn from_iter<I: IntoIterator<Item = Bar>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
