use std::io;

use anyhow::Result;
use clap::Parser;
use iris_cli::{CommonArgs, print_json};
use iris_export::write_trajectory_csv;

/// Sample one period of a circular orbit around earth, mars or the sun.
#[derive(Parser, Debug)]
#[command(author, version, about = "Circular reference orbit track")]
struct Cli {
    /// earth, mars or sun (sun uses a 1 AU radius)
    #[arg(long, default_value = "earth")]
    body: String,

    /// Altitude above the body's surface in km
    #[arg(long = "alt", default_value_t = 500.0, allow_negative_numbers = true)]
    altitude_km: f64,

    /// Number of points (defaults to the settings value)
    #[arg(long, allow_negative_numbers = true)]
    points: Option<i64>,

    /// Write CSV instead of JSON
    #[arg(long, default_value_t = false)]
    csv: bool,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    iris_core::logging::init();
    let cli = Cli::parse();
    let simulator = cli.common.simulator()?;
    let track = simulator.orbit_track(&cli.body, cli.altitude_km, cli.points)?;
    if cli.csv {
        write_trajectory_csv(io::stdout().lock(), &track)?;
        Ok(())
    } else {
        print_json(&track)
    }
}
