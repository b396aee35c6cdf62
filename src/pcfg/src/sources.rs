use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Set of single-byte source identifiers recording which training corpora
/// contributed a terminal or structure.
///
/// Tags form a prefix code: multiple contributing sources concatenate without
/// delimiter, so the set renders in ascending byte order for stable output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceTags(BTreeSet<u8>);

impl SourceTags {
    #[must_use]
    pub fn new() -> SourceTags {
        SourceTags(BTreeSet::new())
    }

    /// Parse the third column of a grammar file row: one tag per byte,
    /// possibly empty.
    #[must_use]
    pub fn parse(column: &[u8]) -> SourceTags {
        SourceTags(column.iter().copied().collect())
    }

    pub fn union_with(&mut self, other: &SourceTags) {
        self.0.extend(other.0.iter().copied());
    }

    #[must_use]
    pub fn contains(&self, tag: u8) -> bool {
        self.0.contains(&tag)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for SourceTags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for tag in &self.0 {
            write!(f, "{}", *tag as char)?;
        }
        Ok(())
    }
}
