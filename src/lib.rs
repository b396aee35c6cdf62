extern crate parser;
extern crate logger;

use parser::{Cli, Commands::*};

#[macro_use]
extern crate log;

use std::error::Error;

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.commands {
        Lookup {lookup} => {
            info!("Starting guess-number lookup");
            rank_lookup::run(&lookup)?;
        },

        FromYaml {yaml} => {
            let cli: Cli = match Cli::deserialize(&yaml) {
                Ok(cli) => cli,
                Err(e)  => return Err(format!("Unable to deserialize arguments from {yaml:?} file: [{e}]").into())
            };
            self::run(cli)?;
        },

        Cite => cite(),
    };
    Ok(())
}

/// Print the literature behind PCFG-based guess numbers.
fn cite() {
    println!("\
grank-rs builds on the probabilistic context-free grammar model of password\n\
guessing. If you use it in academic work, please cite:\n\
\n\
  - Weir, Aggarwal, de Medeiros & Glodek (2009). Password Cracking Using\n\
    Probabilistic Context-Free Grammars. IEEE Symposium on Security and Privacy.\n\
  - Kelley, Komanduri, Mazurek, Shay, Vidas, Bauer, Christin, Cranor & Lopez\n\
    (2012). Guess Again (and Again and Again): Measuring Password Strength by\n\
    Simulating Password-Cracking Algorithms. IEEE Symposium on Security and Privacy.\n\
  - Ur, Segreti, Bauer, Christin, Cranor, Komanduri, Kurilova, Mazurek,\n\
    Melicher & Shay (2015). Measuring Real-World Accuracies and Biases in\n\
    Modeling Password Guessability. USENIX Security Symposium.\
    ");
}
