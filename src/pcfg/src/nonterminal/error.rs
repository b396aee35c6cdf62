use std::path::PathBuf;

use thiserror::Error;

use crate::hexfloat::HexFloatError;
use crate::terminals::MaskError;

#[derive(Error, Debug)]
pub enum NonterminalError {
    #[error("'{repr}' is not a valid nonterminal representation")]
    InvalidRepresentation{repr: String},

    #[error("Failed to open terminal file '{}'", path.display())]
    OpenFile{path: PathBuf, #[source] source: std::io::Error},

    #[error("Failed to memory-map terminal file '{}'. For large grammars, check the OS limits ('nofile' >= 16K, 'vm.max_map_count' >= 200K)", path.display())]
    MapFile{path: PathBuf, #[source] source: std::io::Error},

    #[error("{}:{line}: missing field '{field}'", path.display())]
    MissingField{path: PathBuf, line: usize, field: &'static str},

    #[error("{}:{line}: invalid probability", path.display())]
    BadProbability{path: PathBuf, line: usize, #[source] source: HexFloatError},

    #[error("{}:{line}: probability must be strictly positive", path.display())]
    NonPositiveProbability{path: PathBuf, line: usize},

    #[error("{}:{line}: terminals within a group must be unique and sorted", path.display())]
    UnsortedTerminal{path: PathBuf, line: usize},

    #[error("{}:{line}: invalid generator mask", path.display())]
    BadMask{path: PathBuf, line: usize, #[source] source: MaskError},

    #[error("{}:{line}: generator mask length {got} does not match nonterminal length {want}", path.display())]
    MaskLengthMismatch{path: PathBuf, line: usize, got: usize, want: usize},

    #[error("{}:{line}: unexpected blank line (a single blank line separates the seen and unseen sections)", path.display())]
    UnexpectedBlankLine{path: PathBuf, line: usize},

    #[error("Terminal file '{}' contains no terminal groups", path.display())]
    Empty{path: PathBuf},
}
