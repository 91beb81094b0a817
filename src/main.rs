use clap::Parser;

use ops_scheduler::cli::{Cli, run};
use ops_scheduler::{logger, system_clock};

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();
    log::debug!("Parsed command line: {:?}", cli);

    for line in run(cli, system_clock())? {
        println!("{}", line);
    }
    Ok(())
}
