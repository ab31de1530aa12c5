use anyhow::Result;
use clap::Parser;
use iris_cli::CommonArgs;

/// List stored mission identifiers, oldest first.
#[derive(Parser, Debug)]
#[command(author, version, about = "Stored mission listing")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    iris_core::logging::init();
    let cli = Cli::parse();
    for id in cli.common.simulator()?.list_missions()? {
        println!("{id}");
    }
    Ok(())
}
