use anyhow::Result;
use clap::Parser;
use iris_cli::{CommonArgs, print_json};
use iris_mission::validate::validate_swarm_size;
use iris_store::MissionParameters;

/// Simulate a swarm mission toward a catalog target and store the trajectory.
#[derive(Parser, Debug)]
#[command(author, version, about = "Mission simulation (Hohmann-style transfer, two-body sampling)")]
struct Cli {
    /// Target body name or alias (case-insensitive), e.g. "2I/Borisov"
    #[arg(long)]
    target: String,

    /// Launch epoch as a Julian date
    #[arg(long = "epoch-jd", allow_negative_numbers = true)]
    epoch_jd: f64,

    /// Number of craft in the swarm
    #[arg(long = "swarm-size", allow_negative_numbers = true)]
    swarm_size: i64,

    /// Free-form role assignment label
    #[arg(long = "role-split", default_value = "balanced")]
    role_split: String,

    /// Propulsion type from the settings catalog
    #[arg(long, default_value = "chemical")]
    propulsion: String,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    iris_core::logging::init();
    let cli = Cli::parse();
    let simulator = cli.common.simulator()?;

    let params = MissionParameters {
        target_name: cli.target,
        intercept_epoch: cli.epoch_jd,
        swarm_size: validate_swarm_size(cli.swarm_size)?,
        role_split: cli.role_split,
        propulsion_type: cli.propulsion,
    };
    let summary = simulator.run_simulation(&params)?;
    print_json(&summary)
}
