use std::fmt::{self, Display, Formatter};

use pcfg::count::Count;
use pcfg::hexfloat;
use pcfg::{Grammar, ParseOutcome, SourceTags};

use crate::record::InputRecord;
use crate::table::LookupTable;

/// Best-parse probability fell strictly below the table's cutoff.
pub const CODE_BEYOND_CUTOFF: i64 = -2;
/// No structure signature matches the password (or it is unparseable).
pub const CODE_NO_STRUCTURE: i64 = -4;
/// Some structure matched but a nonterminal did not know the substring.
pub const CODE_NO_TERMINAL: i64 = -8;
/// Some structure matched but a generator mask provably cannot produce the substring.
pub const CODE_CANT_GENERATE: i64 = -32;

/// A finite guess number, or the sum of the negative codes explaining why no
/// rank was found. Codes occupy distinct bits, so the sum encodes a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rank {
    Found(Count),
    Code(i64),
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Found(rank) => write!(f, "{rank}"),
            Rank::Code(code)  => write!(f, "{code}"),
        }
    }
}

/// Per-password answer of the service.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Best-parse probability; `None` renders as the `-1` sentinel.
    pub probability: Option<f64>,
    /// Stable pattern identifier, empty when no parse exists.
    pub pattern_id: String,
    pub rank: Rank,
    /// Union of the chosen groups' source tags, ascending byte order.
    pub tags: SourceTags,
}

impl QueryResult {
    fn failure(code: i64) -> QueryResult {
        QueryResult{
            probability: None,
            pattern_id: String::new(),
            rank: Rank::Code(code),
            tags: SourceTags::new(),
        }
    }
}

/// End-to-end query orchestration: parse the password, pick the best parse,
/// consult the lookup table.
///
/// For a fixed grammar and table, `query` is a pure function; repeated calls
/// return bitwise-identical results.
pub struct GuessNumberService<'a> {
    grammar: &'a Grammar,
    table: &'a LookupTable,
}

impl<'a> GuessNumberService<'a> {
    #[must_use]
    pub fn new(grammar: &'a Grammar, table: &'a LookupTable) -> GuessNumberService<'a> {
        GuessNumberService{grammar, table}
    }

    #[must_use]
    pub fn query(&self, password: &[u8]) -> QueryResult {
        match self.grammar.best_parse(password) {
            ParseOutcome::Unparseable | ParseOutcome::NoStructure => {
                QueryResult::failure(CODE_NO_STRUCTURE)
            }
            ParseOutcome::Rejected{terminal_not_found, cant_be_generated} => {
                let mut code = 0;
                if terminal_not_found {
                    code += CODE_NO_TERMINAL;
                }
                if cant_be_generated {
                    code += CODE_CANT_GENERATE;
                }
                debug_assert_ne!(code, 0, "a rejection carries at least one cause");
                QueryResult::failure(code)
            }
            ParseOutcome::Parsed(best) => {
                let rank = match self.table.rank(best.probability) {
                    Some(rank) => Rank::Found(rank),
                    None       => Rank::Code(CODE_BEYOND_CUTOFF),
                };
                QueryResult{
                    probability: Some(best.probability),
                    pattern_id: self.grammar.pattern_id(&best),
                    rank,
                    tags: best.sources,
                }
            }
        }
    }
}

/// Render one tab-separated output row:
/// `user \t policy \t password \t prob \t pattern \t rank \t tags`.
#[must_use]
pub fn output_row(record: &InputRecord, result: &QueryResult) -> Vec<u8> {
    let probability = match result.probability {
        Some(probability) => hexfloat::emit(probability),
        None              => String::from(hexfloat::SENTINEL),
    };
    let mut row = Vec::with_capacity(
        record.user.len() + record.policy.len() + record.password.len()
        + probability.len() + result.pattern_id.len() + 24,
    );
    row.extend_from_slice(&record.user);
    row.push(b'\t');
    row.extend_from_slice(&record.policy);
    row.push(b'\t');
    row.extend_from_slice(&record.password);
    row.push(b'\t');
    row.extend_from_slice(probability.as_bytes());
    row.push(b'\t');
    row.extend_from_slice(result.pattern_id.as_bytes());
    row.push(b'\t');
    row.extend_from_slice(result.rank.to_string().as_bytes());
    row.push(b'\t');
    row.extend_from_slice(result.tags.to_string().as_bytes());
    row
}
