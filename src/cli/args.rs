use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_CONFIG_FILE, DEFAULT_DATA_URL, DEFAULT_PARAM_ENCODING,
    DEFAULT_PARAM_FILE,
};

#[derive(Parser)]
#[command(name = "smn-ingestor")]
#[command(about = "Push MeteoSwiss SMN station observations to a time-series ingestion API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        default_value = DEFAULT_CONFIG_FILE,
        help = "Configuration file path"
    )]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, transform and upload one batch of observations
    Run {
        #[arg(long, default_value = DEFAULT_DATA_URL, help = "Source CSV feed URL")]
        url: String,

        #[arg(
            long,
            default_value = DEFAULT_PARAM_FILE,
            help = "Parameter metadata CSV path"
        )]
        param_file: PathBuf,

        #[arg(
            long,
            default_value = DEFAULT_PARAM_ENCODING,
            help = "Text encoding of the parameter metadata file"
        )]
        param_encoding: String,

        #[arg(long, help = "Target collection id (overrides the config file)")]
        collection: Option<String>,

        #[arg(long, help = "Skip TLS certificate verification on the source fetch")]
        insecure: bool,

        #[arg(long, help = "Transform only; report the batch without uploading")]
        dry_run: bool,
    },

    /// Register the target collection (one-time administrative call)
    CreateCollection {
        #[arg(long, default_value = DEFAULT_DATA_URL, help = "Source CSV feed URL")]
        url: String,

        #[arg(
            long,
            default_value = DEFAULT_PARAM_FILE,
            help = "Parameter metadata CSV path"
        )]
        param_file: PathBuf,

        #[arg(
            long,
            default_value = DEFAULT_PARAM_ENCODING,
            help = "Text encoding of the parameter metadata file"
        )]
        param_encoding: String,

        #[arg(long, default_value = DEFAULT_COLLECTION_NAME, help = "Collection name")]
        name: String,

        #[arg(long, help = "Skip TLS certificate verification on the source fetch")]
        insecure: bool,
    },
}
