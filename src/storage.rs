use std::fs;
use std::path::PathBuf;

use crate::error::{Context, Result};
use crate::records::StockRecord;

/// Persistence boundary for a completed batch. The pipeline only ever sees
/// this trait; format and destination are wiring concerns.
pub trait RecordSink: Send + Sync {
    fn save(&self, records: &[StockRecord]) -> Result<()>;
}

/// Writes the batch as indented JSON to a single file.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for JsonFileSink {
    fn save(&self, records: &[StockRecord]) -> Result<()> {
        let payload = serde_json::to_vec_pretty(records)?;
        fs::write(&self.path, payload)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::records::DailyBar;

    #[test]
    fn round_trips_records_through_the_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("out.json");

        let mut time_series = BTreeMap::new();
        time_series.insert(
            "2024-01-01".to_string(),
            DailyBar {
                open: 100.0,
                high: 105.0,
                low: 99.0,
                close: 102.0,
                volume: 1000,
            },
        );
        let records = vec![StockRecord {
            symbol: "IBM".to_string(),
            last_refreshed: "2024-01-01".to_string(),
            time_series,
        }];

        JsonFileSink::new(&path).save(&records).expect("save batch");

        let raw = std::fs::read_to_string(&path).expect("read file back");
        let restored: Vec<StockRecord> = serde_json::from_str(&raw).expect("decode file");
        assert_eq!(restored, records);
    }

    #[test]
    fn empty_batch_writes_an_empty_array() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("out.json");

        JsonFileSink::new(&path).save(&[]).expect("save empty batch");

        let raw = std::fs::read_to_string(&path).expect("read file back");
        assert_eq!(raw.trim(), "[]");
    }
}
