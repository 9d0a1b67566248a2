use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// One shaped observation: a station key, a timestamp, and whatever numeric
/// readings the source row carried.
///
/// Serializes flat (`{"key": …, "timestamp": …, "<metric>": …}`) so the
/// ingestion API sees a single-level object per record. The metric set is
/// sparse: readings that failed numeric coercion are simply absent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ObservationRecord {
    pub key: String,
    pub timestamp: String,

    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl ObservationRecord {
    pub fn new(key: String, timestamp: String, metrics: BTreeMap<String, f64>) -> Self {
        Self {
            key,
            timestamp,
            metrics,
        }
    }

    /// Example-derived schema for collection registration: `key` and
    /// `timestamp` first, then metrics, capped at `limit` fields in total.
    pub fn schema_preview(&self, limit: usize) -> Map<String, Value> {
        let mut preview = Map::new();

        let fields = [
            ("key", json!(self.key)),
            ("timestamp", json!(self.timestamp)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .chain(self.metrics.iter().map(|(k, v)| (k.clone(), json!(v))));

        for (name, value) in fields.take(limit) {
            preview.insert(name, value);
        }

        preview
    }
}
