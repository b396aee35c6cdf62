use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, warn};
use num::One;
use trace_error::prelude::*;

use pcfg::count::Count;
use pcfg::hexfloat;

use crate::error::TableError;

/// First field of the table's tail line.
pub const TOTAL_COUNT_PREFIX: &str = "Total count";

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub probability: f64,
    /// Number of strings produced by this pattern and every pattern above it.
    pub cumulative: Count,
}

/// Cutoff-bounded rank table, sorted by descending pattern probability and
/// prefix-summed by the external table-generation pipeline.
///
/// Guess numbers are pattern-head ranks keyed by probability alone: the rank
/// of a probability is one past the cumulative count of all strictly more
/// probable patterns, so equal-probability rows share the first row's head.
pub struct LookupTable {
    rows: Vec<TableRow>,
    total: Count,
}

impl LookupTable {
    /// Load and validate a lookup table file: rows `<prob-hex>\t<cumulative>`
    /// with non-increasing probabilities and strictly increasing counts,
    /// closed by a single `Total count\t<N>` line.
    pub fn load(path: &Path) -> Result<LookupTable> {
        use TableError::{
            BadCount, BadProbability, CumulativeOrder, Empty, MissingField, MissingTotal,
            NonPositiveProbability, Open, ProbabilityOrder, Read, RowAfterTotal,
        };
        let trace_msg = || format!("While loading lookup table '{}'", path.display());
        info!("Loading lookup table '{}'", path.display());

        let file = File::open(path)
            .map_err(|source| Open{path: path.to_path_buf(), source})
            .with_trace(trace_msg)?;

        let mut rows: Vec<TableRow> = Vec::new();
        let mut total: Option<Count> = None;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_number = index + 1;
            let line = line
                .map_err(|source| Read{path: path.to_path_buf(), source})
                .with_trace(trace_msg)?;
            if line.is_empty() {
                continue
            }
            if total.is_some() {
                return Err(RowAfterTotal{path: path.to_path_buf(), line: line_number}).with_trace(trace_msg)
            }
            let (first, second) = line.split_once('\t')
                .ok_or(MissingField{path: path.to_path_buf(), line: line_number})
                .with_trace(trace_msg)?;

            if first == TOTAL_COUNT_PREFIX {
                let count = second.parse::<Count>()
                    .map_err(|_| BadCount{path: path.to_path_buf(), line: line_number})
                    .with_trace(trace_msg)?;
                total = Some(count);
                continue
            }

            let probability = hexfloat::parse(first)
                .map_err(|source| BadProbability{path: path.to_path_buf(), line: line_number, source})
                .with_trace(trace_msg)?;
            if probability <= 0.0 {
                return Err(NonPositiveProbability{path: path.to_path_buf(), line: line_number}).with_trace(trace_msg)
            }
            let cumulative = second.parse::<Count>()
                .map_err(|_| BadCount{path: path.to_path_buf(), line: line_number})
                .with_trace(trace_msg)?;

            if let Some(previous) = rows.last() {
                if probability > previous.probability {
                    return Err(ProbabilityOrder{path: path.to_path_buf(), line: line_number}).with_trace(trace_msg)
                }
                if cumulative <= previous.cumulative {
                    return Err(CumulativeOrder{path: path.to_path_buf(), line: line_number}).with_trace(trace_msg)
                }
            }
            rows.push(TableRow{probability, cumulative});
        }

        let total = total.ok_or(MissingTotal{path: path.to_path_buf()}).with_trace(trace_msg)?;
        if rows.is_empty() {
            return Err(Empty{path: path.to_path_buf()}).with_trace(trace_msg)
        }
        if rows.last().expect("rows is non-empty").cumulative != total {
            warn!(
                "Lookup table '{}': 'Total count' ({total}) differs from the last cumulative count",
                path.display()
            );
        }
        debug!("Lookup table: {} pattern row(s), {total} strings at cutoff", rows.len());
        Ok(LookupTable{rows, total})
    }

    /// Pattern-head rank of `probability`, or `None` when it falls strictly
    /// below the last tabulated row (beyond the table's cutoff).
    #[must_use]
    pub fn rank(&self, probability: f64) -> Option<Count> {
        let strictly_greater = self.rows.partition_point(|row| row.probability > probability);
        if strictly_greater == self.rows.len() {
            return None
        }
        Some(match strictly_greater {
            0  => Count::one(),
            at => &self.rows[at - 1].cumulative + Count::one(),
        })
    }

    #[must_use]
    pub fn total(&self) -> &Count {
        &self.total
    }

    /// The tail line, verbatim: `Total count\t<N>`.
    #[must_use]
    pub fn totals_line(&self) -> String {
        format!("{TOTAL_COUNT_PREFIX}\t{}", self.total)
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
