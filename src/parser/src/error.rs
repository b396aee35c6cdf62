use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("'{0}' is not a file")]
    NotAFile(String),

    #[error("Failed to serialize command line arguments")]
    SerializeArguments(#[source] serde_yaml::Error),

    #[error("Failed to deserialize command line arguments from '{}'", path.display())]
    DeserializeArguments{path: PathBuf, #[source] source: serde_yaml::Error},
}
