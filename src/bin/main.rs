use std::process;

use clap::Parser;
use logger::Logger;

#[macro_use]
extern crate log;

/// Parse command line arguments and run `grank_rs::run()`
fn main() {
    // ----------------------------- Run CLI Parser
    let cli = parser::Cli::parse();

    // ----------------------------- Init logger.
    Logger::init(cli.verbose + u8::from(!cli.quiet));

    // ----------------------------- Serialize command line arguments
    if let Err(e) = cli.serialize() {
        warn!("Failed to serialize command line arguments: {e}");
    }

    // ----------------------------- Run.
    match grank_rs::run(cli) {
        Ok(()) => (),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
}
