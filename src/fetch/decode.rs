use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::records::{DailyBar, StockRecord};

use super::{FetchError, FetchResult};

const ERROR_MESSAGE_KEY: &str = "Error Message";
const META_DATA_KEY: &str = "Meta Data";
const LAST_REFRESHED_KEY: &str = "3. Last Refreshed";
const TIME_SERIES_KEY: &str = "Time Series (Daily)";

/// Decode a daily time-series response body into a `StockRecord`.
///
/// The endpoint nests different shapes per query function, so the body is
/// treated as an untyped document: the metadata and time-series containers
/// are required, but individual date entries are best-effort. A date entry
/// whose value is not an object is skipped; an OHLCV field that fails to
/// parse is zeroed and logged rather than failing the fetch.
pub fn parse_daily_payload(symbol: &str, body: &str) -> FetchResult<StockRecord> {
    let root: Value = serde_json::from_str(body).map_err(|err| FetchError::Malformed {
        symbol: symbol.to_string(),
        detail: format!("body is not valid JSON: {err}"),
    })?;

    // The API reports application-level failures (bad symbol, bad key,
    // exhausted quota) as a 200 with an error message field.
    if let Some(message) = root.get(ERROR_MESSAGE_KEY).and_then(Value::as_str) {
        return Err(FetchError::Api {
            symbol: symbol.to_string(),
            message: message.to_string(),
        });
    }

    let meta = root
        .get(META_DATA_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(symbol, "missing or invalid `Meta Data` object"))?;

    let last_refreshed = meta
        .get(LAST_REFRESHED_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(symbol, "`Meta Data` is missing `3. Last Refreshed`"))?;

    let series = root
        .get(TIME_SERIES_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(symbol, "missing or invalid `Time Series (Daily)` object"))?;

    let mut time_series = BTreeMap::new();
    for (date, values) in series {
        let Some(fields) = values.as_object() else {
            log::warn!("skipping non-object entry {} for {}", date, symbol);
            continue;
        };

        let bar = DailyBar {
            open: read_price(symbol, date, fields, "1. open"),
            high: read_price(symbol, date, fields, "2. high"),
            low: read_price(symbol, date, fields, "3. low"),
            close: read_price(symbol, date, fields, "4. close"),
            volume: read_volume(symbol, date, fields, "5. volume"),
        };
        time_series.insert(date.clone(), bar);
    }

    Ok(StockRecord {
        symbol: symbol.to_string(),
        last_refreshed: last_refreshed.to_string(),
        time_series,
    })
}

fn malformed(symbol: &str, detail: &str) -> FetchError {
    FetchError::Malformed {
        symbol: symbol.to_string(),
        detail: detail.to_string(),
    }
}

fn read_price(symbol: &str, date: &str, fields: &Map<String, Value>, key: &str) -> f64 {
    let parsed = fields.get(key).and_then(|value| {
        value
            .as_str()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .or_else(|| value.as_f64())
    });

    match parsed {
        Some(value) => value,
        None => {
            log::warn!(
                "unparseable field `{}` for {} on {}, defaulting to 0",
                key,
                symbol,
                date
            );
            0.0
        }
    }
}

fn read_volume(symbol: &str, date: &str, fields: &Map<String, Value>, key: &str) -> u64 {
    let parsed = fields.get(key).and_then(|value| {
        value
            .as_str()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .or_else(|| value.as_u64())
    });

    match parsed {
        Some(value) => value,
        None => {
            log::warn!(
                "unparseable field `{}` for {} on {}, defaulting to 0",
                key,
                symbol,
                date
            );
            0
        }
    }
}
