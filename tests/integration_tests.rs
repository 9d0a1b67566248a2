use std::collections::HashMap;
use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::NamedTempFile;

use smn_ingestor::models::Table;
use smn_ingestor::processors::{
    build_parameter_map, clean_name, detect_time_and_station_columns, make_records,
    rename_columns,
};
use smn_ingestor::readers::CsvSource;

/// Feed text shaped like an SMN ten-minute file: parameter codes as headers,
/// one junk column that never parses as a number.
const FEED: &str = "\
station;time;tre200s0;ure200s0;qcflag
BER;2024-01-01 00:00:00;12.3;87;ok
ZRH;2024-01-01 00:10:00;11.0;90;ok
GVE;2024-01-01 00:20:00;13.7;85;ok
";

const METADATA: &str = "\
parameter;parameter_description_de;parameter_description_fr;parameter_description_it;parameter_description_en
tre200s0;de;fr;it;\"Air Temperature 2m; \u{b0}C\"
ure200s0;de;fr;it;\"Relative Humidity; %\"
";

fn transform(feed: &str, metadata: &str) -> Vec<smn_ingestor::models::ObservationRecord> {
    let data = Table::from_delimited_reader(feed.as_bytes(), b';').unwrap();
    let meta = Table::from_delimited_reader(metadata.as_bytes(), b';').unwrap();

    let parameter_map = build_parameter_map(&meta).unwrap();
    let code_to_clean_name: HashMap<String, String> = parameter_map
        .into_iter()
        .map(|(code, description)| (code, clean_name(&description)))
        .collect();

    let renamed = rename_columns(&data, &code_to_clean_name);
    let detected = detect_time_and_station_columns(&renamed).unwrap();
    make_records(&renamed, &detected).unwrap()
}

#[test]
fn test_three_rows_yield_three_records_without_junk_column() {
    let records = transform(FEED, METADATA);

    assert_eq!(records.len(), 3);
    for record in &records {
        assert!(!record.metrics.contains_key("qcflag"));
        assert_eq!(record.metrics.len(), 2);
    }

    assert_eq!(records[0].key, "BER");
    assert_eq!(records[0].timestamp, "2024-01-01T00:00:00");
    assert_eq!(records[0].metrics.get("air_temperature_2m"), Some(&12.3));
    assert_eq!(records[0].metrics.get("relative_humidity"), Some(&87.0));
    assert_eq!(records[2].key, "GVE");
}

#[test]
fn test_records_serialize_to_flat_json_batch() {
    let records = transform(FEED, METADATA);

    let batch = serde_json::to_value(&records).unwrap();

    assert_eq!(
        batch[1],
        json!({
            "key": "ZRH",
            "timestamp": "2024-01-01T00:10:00",
            "air_temperature_2m": 11.0,
            "relative_humidity": 90.0,
        })
    );
}

#[test]
fn test_unmapped_columns_keep_their_codes() {
    // Metadata covering only one of the two parameter columns
    let metadata = "\
parameter;a;b;c;parameter_description_en
tre200s0;de;fr;it;\"Air Temperature 2m; \u{b0}C\"
";

    let records = transform(FEED, metadata);

    assert!(records[0].metrics.contains_key("air_temperature_2m"));
    assert!(records[0].metrics.contains_key("ure200s0"));
}

#[test]
fn test_pipeline_from_latin1_metadata_file() {
    let mut file = NamedTempFile::new().unwrap();
    // Same metadata, but latin1-encoded on disk (0xB0 degree sign)
    file.write_all(
        b"parameter;d;f;i;parameter_description_en\n\
tre200s0;de;fr;it;\"Air Temperature 2m; \xB0C\"\n",
    )
    .unwrap();

    let source = CsvSource::new();
    let meta = source.read_local_csv(file.path(), "latin1").unwrap();
    let map = build_parameter_map(&meta).unwrap();

    assert_eq!(clean_name(&map["tre200s0"]), "air_temperature_2m");
}

#[test]
fn test_single_station_feed_collapses_onto_sentinel_key() {
    let feed = "\
time;tre200s0
2024-01-01 00:00:00;1.5
2024-01-01 00:10:00;1.6
";

    let records = transform(feed, METADATA);

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.key == "SMN_UNSPECIFIED"));
}
