use std::fs;
use std::path::Path;

use ahash::AHashMap;
use itertools::Itertools;
use log::info;
use trace_error::prelude::*;

use crate::nonterminal::Nonterminal;
use crate::structures::Structure;

pub mod error;
pub use error::GrammarError;

mod parse;
pub use parse::{ParseCandidate, ParseOutcome, ParseSet};

/// Structure file within a grammar directory.
pub const STRUCTURES_FILE: &str = "structures.txt";
/// Terminal-file subdirectory within a grammar directory.
pub const TERMINALS_DIR: &str = "terminals";

/// A loaded PCFG: the structure list, a signature index over it, and one
/// [`Nonterminal`] per distinct representation.
///
/// Loaded once and immutable for the lifetime of the process; queries borrow
/// it freely.
pub struct Grammar {
    structures: Vec<Structure>,
    by_signature: AHashMap<String, Vec<usize>>,
    nonterminals: AHashMap<String, Nonterminal>,
}

impl Grammar {
    /// Load a grammar directory: `structures.txt` plus `terminals/<repr>.txt`
    /// per nonterminal referenced by some structure.
    pub fn load(dir: &Path) -> Result<Grammar> {
        use GrammarError::{BadStructure, Empty, ReadStructures};
        let trace_msg = || format!("While loading grammar '{}'", dir.display());

        info!("Loading grammar from '{}'", dir.display());
        let structures_path = dir.join(STRUCTURES_FILE);
        let raw = fs::read_to_string(&structures_path)
            .map_err(|source| ReadStructures{path: structures_path.clone(), source})
            .with_trace(trace_msg)?;

        let mut structures = Vec::new();
        for (index, line) in raw.lines().enumerate() {
            if line.is_empty() {
                continue
            }
            let structure = Structure::parse(line)
                .map_err(|source| BadStructure{path: structures_path.clone(), line: index + 1, source})
                .with_trace(trace_msg)?;
            structures.push(structure);
        }
        if structures.is_empty() {
            return Err(Empty{path: structures_path}).with_trace(trace_msg)
        }

        let mut by_signature: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (index, structure) in structures.iter().enumerate() {
            by_signature.entry(structure.signature().to_string()).or_default().push(index);
        }

        let terminals_dir = dir.join(TERMINALS_DIR);
        let reprs: Vec<&str> = structures.iter()
            .flat_map(|structure| structure.tokens().iter().map(String::as_str))
            .unique()
            .collect();
        let mut nonterminals = AHashMap::with_capacity(reprs.len());
        for repr in reprs {
            let nonterminal = Nonterminal::load(repr, &terminals_dir)
                .with_trace(|| format!("While loading nonterminal '{repr}' of grammar '{}'", dir.display()))?;
            nonterminals.insert(repr.to_string(), nonterminal);
        }

        info!("Grammar loaded: {} structure(s), {} nonterminal(s)", structures.len(), nonterminals.len());
        Ok(Grammar{structures, by_signature, nonterminals})
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    #[must_use]
    pub fn structure(&self, index: usize) -> &Structure {
        &self.structures[index]
    }

    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.iter()
    }

    #[must_use]
    pub fn nonterminal(&self, repr: &str) -> Option<&Nonterminal> {
        self.nonterminals.get(repr)
    }

    /// Indices of every structure whose signature equals `signature`.
    #[must_use]
    pub fn structures_matching(&self, signature: &str) -> &[usize] {
        self.by_signature.get(signature).map_or(&[], Vec::as_slice)
    }
}
