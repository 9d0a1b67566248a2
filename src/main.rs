use clap::Parser;
use smn_ingestor::cli::{run, Cli};
use smn_ingestor::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
