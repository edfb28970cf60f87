use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Daily time-series data for one symbol, as returned by the remote API.
///
/// `last_refreshed` keeps the API-native timestamp string untouched; the
/// date keys of `time_series` are likewise opaque strings. A `BTreeMap`
/// keeps serialized output deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub last_refreshed: String,
    pub time_series: BTreeMap<String, DailyBar>,
}

/// One day of OHLCV values. Fields the upstream payload failed to provide
/// in a parseable form are zeroed rather than rejected (see `fetch::decode`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}
