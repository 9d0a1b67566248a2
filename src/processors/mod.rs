pub mod parameter_map;
pub mod renamer;
pub mod shaper;

pub use parameter_map::{build_parameter_map, clean_name};
pub use renamer::rename_columns;
pub use shaper::{detect_time_and_station_columns, make_records, DetectedColumns};
