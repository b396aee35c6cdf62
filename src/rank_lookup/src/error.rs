use std::path::PathBuf;

use thiserror::Error;

use pcfg::hexfloat::HexFloatError;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to open lookup table '{}'", path.display())]
    Open{path: PathBuf, #[source] source: std::io::Error},

    #[error("Failed to read lookup table '{}'", path.display())]
    Read{path: PathBuf, #[source] source: std::io::Error},

    #[error("{}:{line}: expected '<probability>\\t<cumulative-count>'", path.display())]
    MissingField{path: PathBuf, line: usize},

    #[error("{}:{line}: invalid probability", path.display())]
    BadProbability{path: PathBuf, line: usize, #[source] source: HexFloatError},

    #[error("{}:{line}: probability must be strictly positive", path.display())]
    NonPositiveProbability{path: PathBuf, line: usize},

    #[error("{}:{line}: invalid cumulative count", path.display())]
    BadCount{path: PathBuf, line: usize},

    #[error("{}:{line}: probabilities must be non-increasing", path.display())]
    ProbabilityOrder{path: PathBuf, line: usize},

    #[error("{}:{line}: cumulative counts must be strictly increasing", path.display())]
    CumulativeOrder{path: PathBuf, line: usize},

    #[error("{}:{line}: row after the 'Total count' line", path.display())]
    RowAfterTotal{path: PathBuf, line: usize},

    #[error("Lookup table '{}' is missing its 'Total count' line", path.display())]
    MissingTotal{path: PathBuf},

    #[error("Lookup table '{}' contains no pattern rows", path.display())]
    Empty{path: PathBuf},
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Input line {line}: expected 3 tab-separated columns 'user-id\\tpolicy\\tpassword' (use --single-column for bare passwords)")]
    MissingColumns{line: usize},
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to open input file '{}'", path.display())]
    OpenInput{path: PathBuf, #[source] source: std::io::Error},

    #[error("Failed to read input line {line}")]
    ReadInput{line: usize, #[source] source: std::io::Error},
}

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to create output file '{}'", path.display())]
    Create{path: PathBuf, #[source] source: std::io::Error},

    #[error("Failed to write output row")]
    Write(#[source] std::io::Error),

    #[error("Failed to finalize the gzip output stream")]
    Compress(#[source] gzp::GzpError),

    #[error("'{}' already exists. Use '--overwrite' to force, or pick a different output path", path.display())]
    OverwriteDisallowed{path: PathBuf},
}
