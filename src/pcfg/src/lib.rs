pub mod usld;
pub mod hexfloat;
pub mod count;
pub mod sources;
pub mod terminals;
pub mod nonterminal;
pub mod structures;
pub mod grammar;

pub use count::Count;
pub use sources::SourceTags;
pub use nonterminal::{Nonterminal, TerminalLookup, TerminalMatch};
pub use structures::Structure;
pub use grammar::{Grammar, ParseCandidate, ParseOutcome};
