use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::{IngestError, Result};
use crate::models::{ObservationRecord, Table};
use crate::utils::constants::{
    FALLBACK_STATION_KEY, STATION_COLUMN_CANDIDATES, TIME_COLUMN_CANDIDATES,
};

/// Record fields that must never be overwritten by a metric column.
const RESERVED_FIELDS: &[&str] = &["key", "timestamp"];

const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepted source timestamp layouts, tried in order. The OGD SMN files use
/// `DD.MM.YYYY HH:MM`; the rest cover ISO variants seen in older feeds.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y%m%d%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y%m%d"];

/// Columns the shaper treats specially: the observation time, and the
/// station identifier when the source has one.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedColumns {
    pub time: String,
    pub station: Option<String>,
}

/// Find the time and station columns from the fixed candidate lists.
///
/// A missing time column is a schema failure. A missing station column is
/// not: single-station files carry none, and shaping then keys every row
/// with the fallback sentinel.
pub fn detect_time_and_station_columns(data: &Table) -> Result<DetectedColumns> {
    let time = TIME_COLUMN_CANDIDATES
        .iter()
        .find(|c| data.column_index(c).is_some())
        .map(|c| c.to_string())
        .ok_or_else(|| {
            IngestError::Schema(format!(
                "no time column found; expected one of {:?}",
                TIME_COLUMN_CANDIDATES
            ))
        })?;

    let station = STATION_COLUMN_CANDIDATES
        .iter()
        .find(|c| data.column_index(c).is_some())
        .map(|c| c.to_string());

    Ok(DetectedColumns { time, station })
}

/// Shape each row into an observation record, in input order.
///
/// Per row: the time cell is normalized to `YYYY-MM-DDTHH:MM:SS` where it
/// parses, and kept verbatim otherwise (logged, not fatal); the key is the
/// station cell or the sentinel; every other column becomes a metric if its
/// value parses to a finite float, and is omitted otherwise.
pub fn make_records(data: &Table, columns: &DetectedColumns) -> Result<Vec<ObservationRecord>> {
    let time_idx = data.column_index(&columns.time).ok_or_else(|| {
        IngestError::Schema(format!("time column '{}' not in table", columns.time))
    })?;
    let station_idx = columns
        .station
        .as_deref()
        .and_then(|name| data.column_index(name));

    let mut metric_columns = Vec::new();
    for (idx, name) in data.columns().iter().enumerate() {
        if idx == time_idx || Some(idx) == station_idx {
            continue;
        }
        if RESERVED_FIELDS.contains(&name.as_str()) {
            warn!(column = %name, "column shadows a reserved record field, excluded from metrics");
            continue;
        }
        metric_columns.push((idx, name.clone()));
    }

    let mut records = Vec::with_capacity(data.row_count());
    for row_idx in 0..data.row_count() {
        let raw_time = data.value(row_idx, time_idx).unwrap_or("");
        let timestamp = match normalize_timestamp(raw_time) {
            Some(iso) => iso,
            None => {
                warn!(row = row_idx, value = %raw_time, "unparseable timestamp, keeping raw value");
                raw_time.to_string()
            }
        };

        let key = match station_idx {
            Some(idx) => data.value(row_idx, idx).unwrap_or("").to_string(),
            None => FALLBACK_STATION_KEY.to_string(),
        };

        let mut metrics = BTreeMap::new();
        for (idx, name) in &metric_columns {
            let Some(value) = data.value(row_idx, *idx) else {
                continue;
            };
            if let Ok(parsed) = value.trim().parse::<f64>() {
                if parsed.is_finite() {
                    metrics.insert(name.clone(), parsed);
                }
            }
        }

        records.push(ObservationRecord::new(key, timestamp, metrics));
    }

    Ok(records)
}

/// Best-effort timestamp normalization; `None` means nothing matched.
fn normalize_timestamp(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Offset-carrying inputs keep their wall-clock time, suffix dropped
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local().format(ISO_TIMESTAMP_FORMAT).to_string());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.format(ISO_TIMESTAMP_FORMAT).to_string());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(midnight.format(ISO_TIMESTAMP_FORMAT).to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_detect_requires_time_column() {
        let data = table(&["station", "temp"], &[]);

        let result = detect_time_and_station_columns(&data);

        assert!(matches!(result, Err(IngestError::Schema(_))));
    }

    #[test]
    fn test_detect_station_optional() {
        let data = table(&["time", "temp"], &[]);

        let detected = detect_time_and_station_columns(&data).unwrap();

        assert_eq!(detected.time, "time");
        assert_eq!(detected.station, None);
    }

    #[test]
    fn test_detect_prefers_reference_timestamp() {
        let data = table(&["date", "reference_timestamp", "station_abbr"], &[]);

        let detected = detect_time_and_station_columns(&data).unwrap();

        assert_eq!(detected.time, "reference_timestamp");
        assert_eq!(detected.station, Some("station_abbr".to_string()));
    }

    #[test]
    fn test_make_records_shapes_row() {
        let data = table(
            &["time", "station", "temp", "flag"],
            &[&["2024-01-01 00:10:00", "BER", "12.3", "NaN"]],
        );
        let detected = detect_time_and_station_columns(&data).unwrap();

        let records = make_records(&data, &detected).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.key, "BER");
        assert_eq!(record.timestamp, "2024-01-01T00:10:00");
        assert_eq!(record.metrics.get("temp"), Some(&12.3));
        assert!(!record.metrics.contains_key("flag"));
    }

    #[test]
    fn test_make_records_sentinel_key_without_station() {
        let data = table(
            &["time", "temp"],
            &[&["2024-01-01 00:00:00", "1.0"], &["2024-01-01 00:10:00", "2.0"]],
        );
        let detected = detect_time_and_station_columns(&data).unwrap();

        let records = make_records(&data, &detected).unwrap();

        assert!(records.iter().all(|r| r.key == "SMN_UNSPECIFIED"));
    }

    #[test]
    fn test_make_records_raw_timestamp_fallback() {
        let data = table(&["time", "station", "temp"], &[&["not a date", "BER", "5"]]);
        let detected = detect_time_and_station_columns(&data).unwrap();

        let records = make_records(&data, &detected).unwrap();

        assert_eq!(records[0].timestamp, "not a date");
        assert_eq!(records[0].metrics.get("temp"), Some(&5.0));
    }

    #[test]
    fn test_make_records_drops_non_finite_values() {
        let data = table(
            &["time", "station", "a", "b", "c", "d"],
            &[&["2024-01-01 00:00:00", "BER", "inf", "-inf", "nan", ""]],
        );
        let detected = detect_time_and_station_columns(&data).unwrap();

        let records = make_records(&data, &detected).unwrap();

        assert!(records[0].metrics.is_empty());
    }

    #[test]
    fn test_make_records_excludes_reserved_columns() {
        let data = table(
            &["time", "station", "key", "timestamp", "temp"],
            &[&["2024-01-01 00:00:00", "BER", "7", "8", "9"]],
        );
        let detected = detect_time_and_station_columns(&data).unwrap();

        let records = make_records(&data, &detected).unwrap();

        assert_eq!(records[0].key, "BER");
        assert_eq!(records[0].timestamp, "2024-01-01T00:00:00");
        assert_eq!(records[0].metrics.len(), 1);
        assert_eq!(records[0].metrics.get("temp"), Some(&9.0));
    }

    #[test]
    fn test_make_records_preserves_row_order() {
        let data = table(
            &["time", "station", "temp"],
            &[
                &["2024-01-01 00:00:00", "ZRH", "1"],
                &["2024-01-01 00:10:00", "BER", "2"],
            ],
        );
        let detected = detect_time_and_station_columns(&data).unwrap();

        let records = make_records(&data, &detected).unwrap();

        assert_eq!(records[0].key, "ZRH");
        assert_eq!(records[1].key, "BER");
    }

    #[test]
    fn test_normalize_timestamp_formats() {
        let cases = [
            ("2024-01-01 00:10:00", "2024-01-01T00:10:00"),
            ("2024-01-01T00:10:00", "2024-01-01T00:10:00"),
            ("01.01.2024 00:10", "2024-01-01T00:10:00"),
            ("202401010010", "2024-01-01T00:10:00"),
            ("2024-01-01", "2024-01-01T00:00:00"),
            // Offset dropped, wall-clock kept
            ("2024-01-01T00:10:00+01:00", "2024-01-01T00:10:00"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_timestamp(input).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_normalize_timestamp_rejects_junk() {
        assert_eq!(normalize_timestamp(""), None);
        assert_eq!(normalize_timestamp("garbage"), None);
    }
}
