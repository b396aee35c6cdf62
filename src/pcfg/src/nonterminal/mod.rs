use std::{fs::File, path::{Path, PathBuf}};

use log::{debug, trace, warn};
use memmap2::Mmap;

use crate::count::Count;
use crate::hexfloat;
use crate::sources::SourceTags;
use crate::terminals::{GeneratorMask, GroupMatch, GroupStrings, SeenGroup, Span, TerminalGroup, UnseenGroup};
use crate::usld;

pub mod error;
pub use error::NonterminalError;

/// Successful terminal lookup under one nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalMatch {
    /// Stable index of the accepting group, in file load order.
    pub group_index: usize,
    pub within_index: Count,
    pub sources: SourceTags,
}

/// Outcome of [`Nonterminal::lookup`].
///
/// `NotFound` covers both a class-signature mismatch and plain absence from an
/// all-seen nonterminal; `CantBeGenerated` means the nonterminal has an unseen
/// section whose generator masks provably cannot produce the string either.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalLookup {
    Found{probability: f64, matched: TerminalMatch},
    NotFound,
    CantBeGenerated,
}

/// One PCFG nonterminal, identified by its USLD representation.
///
/// Owns the read-only memory map of `terminals/<repr'>.txt` (`repr'` = repr
/// with `U` replaced by `L`: terminals are stored lowercased) and the ordered
/// group vector scanned from it. Groups address the map by byte offset and
/// never outlive the owner.
pub struct Nonterminal {
    repr: String,
    path: PathBuf,
    mmap: Mmap,
    groups: Vec<TerminalGroup>,
    has_unseen: bool,
}

impl Nonterminal {
    /// Map and scan a terminal file.
    ///
    /// The file descriptor is released on return; the mapping survives it, so
    /// the open-fd budget stays at one per nonterminal during load only.
    pub fn load(repr: &str, terminals_dir: &Path) -> Result<Nonterminal, NonterminalError> {
        if !usld::is_representation(repr) {
            return Err(NonterminalError::InvalidRepresentation{repr: repr.to_string()})
        }
        let path = terminals_dir.join(format!("{}.txt", repr.replace('U', "L")));
        debug!("Loading nonterminal '{repr}' from '{}'", path.display());

        let file = File::open(&path)
            .map_err(|source| NonterminalError::OpenFile{path: path.clone(), source})?;
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|source| NonterminalError::MapFile{path: path.clone(), source})?;

        let (groups, has_unseen) = Self::scan_groups(&mmap, &path, repr.len())?;
        if groups.is_empty() {
            return Err(NonterminalError::Empty{path})
        }
        trace!("'{repr}': {} terminal group(s), unseen section: {has_unseen}", groups.len());
        Ok(Nonterminal{repr: repr.to_string(), path, mmap, groups, has_unseen})
    }

    /// Single pass over the mapped bytes: seen lines coalesce into maximal
    /// equal-probability runs, one blank line switches to the unseen section,
    /// and each unseen line becomes its own mask group.
    fn scan_groups(
        data: &[u8],
        path: &Path,
        nonterminal_len: usize,
    ) -> Result<(Vec<TerminalGroup>, bool), NonterminalError> {
        let mut groups: Vec<TerminalGroup> = Vec::new();
        let mut in_unseen = false;
        let mut running_prob: Option<f64> = None;
        let mut running_lines: Vec<Span> = Vec::new();
        let mut previous_terminal: Option<&[u8]> = None;
        let mut previous_group_prob: Option<f64> = None;

        let mut offset = 0usize;
        let mut line_number = 0usize;
        while offset < data.len() {
            let end = data[offset..].iter().position(|byte| *byte == b'\n')
                .map_or(data.len(), |at| offset + at);
            let span = Span{start: offset, end};
            let line = span.of(data);
            offset = end + 1;
            line_number += 1;

            if line.is_empty() {
                if in_unseen {
                    return Err(NonterminalError::UnexpectedBlankLine{path: path.to_path_buf(), line: line_number})
                }
                if let Some(probability) = running_prob.take() {
                    groups.push(TerminalGroup::Seen(SeenGroup::new(probability, std::mem::take(&mut running_lines))));
                }
                previous_terminal = None;
                in_unseen = true;
                continue
            }

            let mut fields = line.split(|byte| *byte == b'\t');
            let terminal = fields.next().unwrap_or(b"");
            let probability_text = fields.next()
                .ok_or(NonterminalError::MissingField{path: path.to_path_buf(), line: line_number, field: "probability"})?;
            let third = fields.next();

            let probability = hexfloat::parse(&String::from_utf8_lossy(probability_text))
                .map_err(|source| NonterminalError::BadProbability{path: path.to_path_buf(), line: line_number, source})?;
            if probability <= 0.0 {
                return Err(NonterminalError::NonPositiveProbability{path: path.to_path_buf(), line: line_number})
            }

            if in_unseen {
                let mask_bytes = third
                    .ok_or(NonterminalError::MissingField{path: path.to_path_buf(), line: line_number, field: "generator mask"})?;
                let mask = GeneratorMask::parse(mask_bytes)
                    .map_err(|source| NonterminalError::BadMask{path: path.to_path_buf(), line: line_number, source})?;
                if mask.len() != nonterminal_len {
                    return Err(NonterminalError::MaskLengthMismatch{
                        path: path.to_path_buf(), line: line_number, got: mask.len(), want: nonterminal_len,
                    })
                }
                groups.push(TerminalGroup::Unseen(UnseenGroup::new(probability, mask)));
                continue
            }

            if terminal.is_empty() {
                return Err(NonterminalError::MissingField{path: path.to_path_buf(), line: line_number, field: "terminal"})
            }
            let same_group = running_prob.is_some_and(|previous| previous.to_bits() == probability.to_bits());
            if same_group {
                if previous_terminal.is_some_and(|previous| previous >= terminal) {
                    return Err(NonterminalError::UnsortedTerminal{path: path.to_path_buf(), line: line_number})
                }
            } else {
                if let Some(finished) = running_prob.take() {
                    groups.push(TerminalGroup::Seen(SeenGroup::new(finished, std::mem::take(&mut running_lines))));
                }
                if previous_group_prob.is_some_and(|previous| probability > previous) {
                    warn!("{}:{line_number}: seen groups are not laid out by decreasing probability", path.display());
                }
                previous_group_prob = Some(probability);
                running_prob = Some(probability);
            }
            previous_terminal = Some(terminal);
            running_lines.push(span);
        }
        if let Some(finished) = running_prob.take() {
            groups.push(TerminalGroup::Seen(SeenGroup::new(finished, running_lines)));
        }
        Ok((groups, in_unseen))
    }

    /// Find the string under this nonterminal.
    ///
    /// The class signature is checked first, then the downcased string is
    /// offered to every group in load order. First hit wins; within a group
    /// the index is unique.
    #[must_use]
    pub fn lookup(&self, password: &[u8]) -> TerminalLookup {
        match usld::signature(password) {
            Ok(signature) if signature == self.repr => (),
            _ => return TerminalLookup::NotFound,
        }
        let lowered = password.to_ascii_lowercase();
        for (group_index, group) in self.groups.iter().enumerate() {
            if let Some(hit) = group.lookup(&self.mmap, &lowered) {
                return TerminalLookup::Found{
                    probability: group.probability(),
                    matched: TerminalMatch{
                        group_index,
                        within_index: hit.within_index,
                        sources: hit.sources,
                    },
                }
            }
        }
        match self.has_unseen {
            true  => TerminalLookup::CantBeGenerated,
            false => TerminalLookup::NotFound,
        }
    }

    #[must_use]
    pub fn repr(&self) -> &str {
        &self.repr
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn has_unseen(&self) -> bool {
        self.has_unseen
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn group(&self, index: usize) -> &TerminalGroup {
        &self.groups[index]
    }

    pub fn groups(&self) -> impl Iterator<Item = &TerminalGroup> {
        self.groups.iter()
    }

    #[must_use]
    pub fn probability(&self, group_index: usize) -> f64 {
        self.groups[group_index].probability()
    }

    #[must_use]
    pub fn count_strings(&self, group_index: usize) -> Count {
        self.groups[group_index].count_strings()
    }

    #[must_use]
    pub fn first_string(&self, group_index: usize) -> String {
        self.groups[group_index].first_string(&self.mmap)
    }

    #[must_use]
    pub fn nth_string(&self, group_index: usize, index: &Count) -> Option<String> {
        self.groups[group_index].nth_string(&self.mmap, index)
    }

    /// Iterator over one group's strings in canonical order.
    #[must_use]
    pub fn iter_group_strings(&self, group_index: usize) -> GroupStrings<'_> {
        self.groups[group_index].iter_strings(&self.mmap)
    }

    /// Offer a (downcased) string to one specific group.
    #[must_use]
    pub fn lookup_in_group(&self, group_index: usize, s: &[u8]) -> Option<GroupMatch> {
        self.groups[group_index].lookup(&self.mmap, s)
    }
}
