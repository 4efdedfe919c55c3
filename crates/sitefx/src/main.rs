mod cli;
mod run;
mod simulate;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Profile(args) => run::run_profile(args),
        Command::Layout(args) => run::run_layout(args),
        Command::Simulate(args) => simulate::run_simulate(args),
    }
}
