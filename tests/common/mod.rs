pub mod fixture;

use std::fs;
use std::path::Path;

use parser::LookupArgs;

/// Run a batch lookup through the library entry point and hand back the raw
/// result bytes.
pub fn run_lookup(
    grammar: &Path,
    table: &Path,
    input: &Path,
    output: &Path,
    single_column: bool,
) -> anyhow::Result<Vec<u8>> {
    let args = LookupArgs{
        grammar: grammar.to_path_buf(),
        table: table.to_path_buf(),
        input: Some(input.to_path_buf()),
        single_column,
        output: Some(output.to_path_buf()),
        totals: None,
        overwrite: true,
    };
    rank_lookup::run(&args)?;
    Ok(fs::read(output)?)
}

/// Split `output` into its rows, without the trailing newline.
pub fn rows(output: &[u8]) -> Vec<&[u8]> {
    output.split(|byte| *byte == b'\n').filter(|row| !row.is_empty()).collect()
}
