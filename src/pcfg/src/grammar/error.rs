use std::path::PathBuf;

use thiserror::Error;

use crate::structures::StructureError;

#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("Failed to read structures file '{}'", path.display())]
    ReadStructures{path: PathBuf, #[source] source: std::io::Error},

    #[error("{}:{line}: invalid structure", path.display())]
    BadStructure{path: PathBuf, line: usize, #[source] source: StructureError},

    #[error("Grammar '{}' defines no structures", path.display())]
    Empty{path: PathBuf},
}
