pub mod error;
pub mod table;
pub mod record;
pub mod io;
pub mod service;

use std::fs::File;
use std::io::{BufRead, BufReader};

use log::{info, warn};
use trace_error::prelude::*;

use pcfg::Grammar;
use parser::LookupArgs;

use crate::error::RunError;
use crate::io::OutputWriter;
use crate::record::InputRecord;
use crate::service::{GuessNumberService, Rank};
use crate::table::LookupTable;

/// Batch guess-number lookup: load the grammar and table, then stream the
/// test file through [`GuessNumberService`].
///
/// Infrastructure failures (unreadable grammar, malformed table, IO errors)
/// abort the batch; per-password failures become negative rank codes in the
/// output and processing continues.
pub fn run(args: &LookupArgs) -> Result<()> {
    // ---- Refuse to clobber existing result files unless --overwrite.
    for target in [&args.output, &args.totals].into_iter().flatten() {
        io::ensure_writable(args.overwrite, target)?;
    }

    // ---- Load the grammar and the lookup table.
    let grammar = Grammar::load(&args.grammar)?;
    let table = LookupTable::load(&args.table)?;
    let service = GuessNumberService::new(&grammar, &table);

    // ---- Choose between file handle or standard input.
    let mut reader: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|source| RunError::OpenInput{path: path.clone(), source})
                .with_trace(|| format!("While opening test password file '{}'", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let mut writer = OutputWriter::create(args.output.as_deref())?;

    // ---- Stream records.
    info!("Processing test passwords...");
    let mut line_number = 0usize;
    let mut ranked = 0u64;
    let mut failed = 0u64;
    let mut buffer: Vec<u8> = Vec::new();
    loop {
        buffer.clear();
        let read = reader.read_until(b'\n', &mut buffer)
            .map_err(|source| RunError::ReadInput{line: line_number + 1, source})
            .trace("While reading test passwords")?;
        if read == 0 {
            break
        }
        line_number += 1;
        if buffer.last() == Some(&b'\n') {
            buffer.pop();
        }
        if buffer.is_empty() {
            warn!("line {line_number}: skipping empty line");
            continue
        }

        let record = InputRecord::parse(&buffer, args.single_column, line_number)
            .trace("While parsing the test password file")?;
        let result = service.query(&record.password);
        match result.rank {
            Rank::Found(_) => ranked += 1,
            Rank::Code(_)  => failed += 1,
        }
        writer.write_row(&service::output_row(&record, &result))?;
    }
    writer.finish()?;

    // ---- Copy the totals line from the table tail.
    if let Some(totals_path) = &args.totals {
        let mut totals = OutputWriter::create(Some(totals_path))?;
        totals.write_row(table.totals_line().as_bytes())?;
        totals.finish()?;
    }

    info!("Done: {ranked} password(s) ranked, {failed} without a rank, out of {} line(s)", line_number);
    Ok(())
}
