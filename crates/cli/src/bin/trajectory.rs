use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use iris_cli::{CommonArgs, print_json};
use iris_export::export_record;
use iris_store::MissionId;
use tracing::info;

/// Print or export a stored mission record.
#[derive(Parser, Debug)]
#[command(author, version, about = "Stored trajectory retrieval and export")]
struct Cli {
    /// Mission identifier, e.g. mission_20191009_000000_000
    mission_id: String,

    /// Leading points echoed to the log (stderr) before printing
    #[arg(long)]
    sample: Option<usize>,

    /// Export to a .csv (points) or .json (record) file, or '-' for JSON on stdout
    #[arg(long)]
    export: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    iris_core::logging::init();
    let cli = Cli::parse();
    let simulator = cli.common.simulator()?;
    let id = MissionId::parse(&cli.mission_id)?;
    let record = simulator.retrieve(&id, cli.sample)?;

    match cli.export {
        Some(path) => {
            let format = export_record(&path, &record)?;
            info!(path = %path.display(), ?format, "exported mission");
            Ok(())
        }
        None => print_json(&record),
    }
}
