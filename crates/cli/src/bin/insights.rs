use anyhow::Result;
use clap::Parser;
use iris_cli::{CommonArgs, print_json};
use iris_insights::HttpSummarizer;
use iris_store::MissionId;

/// Summarize a stored mission. Without an API key the fixed fallback text is returned.
#[derive(Parser, Debug)]
#[command(author, version, about = "Mission insights")]
struct Cli {
    mission_id: String,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    iris_core::logging::init();
    let cli = Cli::parse();
    let simulator = cli.common.simulator()?;
    let summarizer = HttpSummarizer::from_config(&simulator.settings().insights)?;
    let id = MissionId::parse(&cli.mission_id)?;
    print_json(&simulator.mission_insights(&id, &summarizer)?)
}
