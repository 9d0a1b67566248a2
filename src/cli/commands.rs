use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::models::ObservationRecord;
use crate::processors::{
    build_parameter_map, clean_name, detect_time_and_station_columns, make_records,
    rename_columns,
};
use crate::readers::CsvSource;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CollectionSpec, IngestClient, RegistrationOutcome, UploadOutcome};

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose);

    let settings = Settings::load(&cli.config)?;
    debug!(config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Run {
            url,
            param_file,
            param_encoding,
            collection,
            insecure,
            dry_run,
        } => {
            let insecure = insecure || settings.allow_invalid_certs;
            let records = transform(&url, &param_file, &param_encoding, insecure)?;

            if records.is_empty() {
                println!("No records to send (after filtering).");
                return Ok(());
            }

            if dry_run {
                println!(
                    "Dry run: {} records ready for {}",
                    records.len(),
                    settings
                        .collection_id(collection.as_deref())
                        .unwrap_or("<unset collection>")
                );
                return Ok(());
            }

            let collection_id = settings.collection_id(collection.as_deref())?;
            let write_key = settings.write_key()?;
            let client = IngestClient::new(&settings.base_url, &settings.project_id)
                .with_accept_invalid_certs(insecure);

            let outcome = {
                let progress =
                    ProgressReporter::spinner(&format!("Uploading {} records...", records.len()));
                let outcome = client.send_batch(collection_id, write_key, &records)?;
                progress.finish_with_message("Upload finished");
                outcome
            };

            match outcome {
                UploadOutcome::Success { records_sent } => {
                    println!("✅ Sent {} records", records_sent);
                }
                UploadOutcome::Failure { status, body } => {
                    println!("❌ Failed to send data ({}): {}", status, body);
                }
            }

            Ok(())
        }

        Commands::CreateCollection {
            url,
            param_file,
            param_encoding,
            name,
            insecure,
        } => {
            let insecure = insecure || settings.allow_invalid_certs;
            let records = transform(&url, &param_file, &param_encoding, insecure)?;

            let Some(example) = records.first() else {
                println!("No records available to derive a collection schema from.");
                return Ok(());
            };

            let master_key = settings.master_key()?;
            let spec = CollectionSpec {
                name,
                ..CollectionSpec::default()
            };
            let client = IngestClient::new(&settings.base_url, &settings.project_id)
                .with_accept_invalid_certs(insecure);

            match client.create_collection(master_key, &spec, example)? {
                RegistrationOutcome::Created { status, descriptor } => {
                    println!("Create collection: {} {}", status, descriptor);
                }
                RegistrationOutcome::Rejected { status, body } => {
                    println!("Create collection: {} {}", status, body);
                }
            }

            Ok(())
        }
    }
}

/// The download, map, rename and shape half of the pipeline, shared by both
/// subcommands.
fn transform(
    url: &str,
    param_file: &Path,
    param_encoding: &str,
    insecure: bool,
) -> Result<Vec<ObservationRecord>> {
    let source = CsvSource::new().with_accept_invalid_certs(insecure);

    let data = {
        let progress = ProgressReporter::spinner("Downloading source feed...");
        let data = source.fetch_remote_csv(url)?;
        progress.finish_with_message(&format!("Downloaded {} rows", data.row_count()));
        data
    };

    let metadata = source.read_local_csv(param_file, param_encoding)?;
    let parameter_map = build_parameter_map(&metadata)?;
    info!(parameters = parameter_map.len(), "parameter dictionary loaded");

    let code_to_clean_name: HashMap<String, String> = parameter_map
        .into_iter()
        .map(|(code, description)| (code, clean_name(&description)))
        .collect();

    let renamed = rename_columns(&data, &code_to_clean_name);

    let detected = detect_time_and_station_columns(&renamed)?;
    debug!(time = %detected.time, station = ?detected.station, "columns detected");

    make_records(&renamed, &detected)
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("smn_ingestor={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
