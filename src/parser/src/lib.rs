use std::{fs::File, path::PathBuf};

use trace_error::prelude::*;

use clap::{Parser, Subcommand, Args};
use serde::{Serialize, Deserialize};
use log::debug;

mod error;
pub use error::ParserError;

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(name="grank-rs", author, version, about, long_about = None)]
#[clap(propagate_version = true)]
/// grank-rs: guess-number calculation for passwords under PCFGs
pub struct Cli {
    ///Set the verbosity level (-v -vv -vvv)
    ///
    /// Set the verbosity level of this program. Multiple levels allowed {n}
    ///
    /// -v: Info  |  -vv: Debug  | -vvv: Trace {n}
    ///
    /// Note that the program will still output warnings by default, even when this flag is off.
    /// Use the --quiet/-q flag to disable them
    #[clap(short='v', long, parse(from_occurrences), global=true)]
    pub verbose: u8,

    /// Disable warnings.
    ///
    /// By default, warnings are emitted and redirected to the console, even when verbose mode is
    /// off. Use this argument to disable this. Only errors will be displayed.
    #[clap(short='q', long, global=true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub commands: Commands,
}

impl Cli {
    /// Serialize command line arguments within a `.yaml` file.
    ///
    /// # Behavior
    /// - Only applies to the `lookup` subcommand, and only when `--output` names a file: the
    ///   arguments land next to it, as '{current time}-lookup.yaml'. Current time follows the
    ///   format `YYYY`-`MM`-`DD`T`hhmmss`
    /// - Results written to the standard output leave no argument file behind.
    ///
    /// # Errors
    /// Sends an unrecoverable error if `serde_yaml` fails to parse `Self` to a string, or if the
    /// file cannot be written.
    pub fn serialize(&self) -> Result<()> {
        let serialized = serde_yaml::to_string(&self)
            .map_err(ParserError::SerializeArguments)
            .trace("While serializing command line arguments")?;

        debug!("\n---- Command line args ----\n{}\n---", serialized);

        let Commands::Lookup{lookup} = &self.commands else {
            return Ok(())
        };
        let Some(output) = &lookup.output else {
            return Ok(())
        };

        let current_time = chrono::offset::Local::now().format("%Y-%m-%dT%H%M%S").to_string();
        let output_dir = output.parent().unwrap_or_else(|| std::path::Path::new("."));
        let argument_file = output_dir.join(format!("{current_time}-lookup.yaml"));

        std::fs::write(&argument_file, serialized)
            .with_trace(|| format!("Unable to serialize arguments into {}", argument_file.display()))
    }

    /// Deserialize a `.yaml` file into command line arguments.
    ///
    /// # Errors
    /// - Returns `FileNotFound` or `PermissionDenied` if the provided `.yaml` is invalid, or does
    ///   not carry read permissions
    /// - Sends an unrecoverable error if `serde_yaml` fails to parse the provided file to `Self`.
    pub fn deserialize(yaml: &PathBuf) -> Result<Self> {
        let file = File::open(yaml)
            .with_trace(|| format!("While opening argument file {}", yaml.display()))?;
        serde_yaml::from_reader(file)
            .map_err(|source| ParserError::DeserializeArguments{path: yaml.clone(), source})
            .trace("While deserializing command line arguments")
    }
}

#[derive(Subcommand, Debug, Serialize, Deserialize)]
pub enum Commands {
    /// Compute guess numbers for a batch of test passwords.
    ///
    /// Loads a trained grammar directory and a cutoff-bounded lookup table, then
    /// emits one tab-separated result row per input password.
    Lookup {
        #[clap(flatten)]
        lookup: LookupArgs
    },

    /// Run grank-rs using a previously generated .yaml configuration file.
    ///
    /// This allows users to easily re-apply a grank-rs command using the exact same parameters
    /// and arguments.
    FromYaml {
        yaml: PathBuf,
    },

    Cite
}

#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct LookupArgs {
    /// Grammar directory produced by the training pipeline.
    ///
    /// Must contain a 'structures.txt' file and a 'terminals/' subdirectory holding one
    /// '<representation>.txt' file per nonterminal referenced by the structures.
    #[clap(short, long, parse(try_from_str=valid_input_dir))]
    pub grammar: PathBuf,

    /// Cutoff-bounded lookup table file.
    ///
    /// Tab-separated rows of '<probability-hex-float> <cumulative-count>', sorted by decreasing
    /// probability, with a final 'Total count' row. Built externally by the table-generation
    /// pipeline.
    #[clap(short, long, parse(try_from_str=valid_input_file))]
    pub table: PathBuf,

    /// Test password file.
    ///
    /// Three tab-separated columns 'user-id policy password' by default; see --single-column for
    /// the one-column format. Reads the standard input when this argument is omitted. i.e:{n}
    ///
    /// ```text
    /// zcat test-set.tsv.gz | grank-rs lookup [...]{n}
    /// ```
    #[clap(short, long)]
    pub input: Option<PathBuf>,

    /// Treat each input line as a bare password.
    ///
    /// The user-id and policy columns of the output are left empty.
    #[clap(short='1', long)]
    pub single_column: bool,

    /// Result file (defaults to the standard output).
    ///
    /// One tab-separated row per input password:{n}
    ///   'user-id policy password probability pattern rank tags'{n}
    ///
    /// A '.gz' extension triggers gzip compression on the fly.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Where to copy the table's 'Total count' line.
    #[clap(long)]
    pub totals: Option<PathBuf>,

    /// Overwrite existing output files.
    ///
    /// By default, grank-rs does not allow itself from overwriting existing result files. Use
    /// this flag to force this behaviour.
    #[clap(short='w', long)]
    pub overwrite: bool,
}

/// Tilde-expand a user-provided path and require an existing directory.
fn valid_input_dir(raw: &str) -> Result<PathBuf, String> {
    let path = expand(raw)?;
    match path.is_dir() {
        true  => Ok(path),
        false => Err(ParserError::NotADirectory(raw.to_string()).to_string()),
    }
}

/// Tilde-expand a user-provided path and require an existing file.
fn valid_input_file(raw: &str) -> Result<PathBuf, String> {
    let path = expand(raw)?;
    match path.is_file() {
        true  => Ok(path),
        false => Err(ParserError::NotAFile(raw.to_string()).to_string()),
    }
}

fn expand(raw: &str) -> Result<PathBuf, String> {
    expanduser::expanduser(raw).map_err(|err| err.to_string())
}
