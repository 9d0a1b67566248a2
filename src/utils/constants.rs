/// Default SMN source feed (ten-minute "now" file for the air temperature set)
pub const DEFAULT_DATA_URL: &str =
    "https://data.geo.admin.ch/ch.meteoschweiz.ogd-smn/tae/ogd-smn_tae_t_now.csv";

/// Parameter metadata file published alongside the feed
pub const DEFAULT_PARAM_FILE: &str = "ogd-smn_meta_parameters.csv";

/// The metadata file ships in a legacy single-byte encoding, not UTF-8
pub const DEFAULT_PARAM_ENCODING: &str = "latin1";

/// Default configuration file
pub const DEFAULT_CONFIG_FILE: &str = "configs.json";

/// SMN files are semicolon-delimited
pub const FEED_DELIMITER: u8 = b';';

/// Candidate headers for the observation time column, highest priority first
pub const TIME_COLUMN_CANDIDATES: &[&str] = &[
    "reference_timestamp",
    "time",
    "date",
    "timestamp",
    "mes_ts_utc",
    "datetime",
];

/// Candidate headers for the station identifier column, highest priority first
pub const STATION_COLUMN_CANDIDATES: &[&str] = &[
    "station",
    "station_abbr",
    "stn",
    "nat_abbr",
    "stationcode",
    "smn_id",
];

/// Record key used when the source has no per-station column
pub const FALLBACK_STATION_KEY: &str = "SMN_UNSPECIFIED";

/// Timeout budgets (seconds)
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30;
pub const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Collection registration defaults
pub const DEFAULT_COLLECTION_NAME: &str = "meteoswiss_tenmin";
pub const DEFAULT_COLLECTION_DESCRIPTION: &str = "MeteoSwiss SMN ten-minute data";
pub const DEFAULT_COLLECTION_TAGS: &[&str] = &["meteoswiss", "weather", "smn", "tenmin"];

/// Maximum number of fields in the schema preview sent on collection creation
pub const SCHEMA_PREVIEW_FIELDS: usize = 15;
