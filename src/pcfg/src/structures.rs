use thiserror::Error;

use crate::hexfloat::{self, HexFloatError};
use crate::sources::SourceTags;
use crate::usld;

#[derive(Error, Debug)]
pub enum StructureError {
    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Structure has no nonterminals")]
    EmptyTokens,

    #[error("'{0}' is not a valid nonterminal representation")]
    BadToken(String),

    #[error("Invalid probability")]
    BadProbability(#[source] HexFloatError),

    #[error("Probability must be strictly positive")]
    NonPositiveProbability,
}

/// One production of the grammar: an ordered sequence of nonterminal
/// representations with a structure probability.
///
/// The concatenation of the representations forms the structure's USLD
/// signature; the structure applies to a password iff the signature equals the
/// password's own signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    tokens: Vec<String>,
    signature: String,
    probability: f64,
    sources: SourceTags,
}

impl Structure {
    /// Parse one `structures.txt` row:
    /// `<space-separated nonterminal representations>\t<prob-hex>\t<source-ids>`.
    pub fn parse(line: &str) -> Result<Structure, StructureError> {
        let mut fields = line.split('\t');
        let token_list = fields.next().filter(|f| !f.is_empty())
            .ok_or(StructureError::MissingField("nonterminal sequence"))?;
        let probability_text = fields.next()
            .ok_or(StructureError::MissingField("probability"))?;
        let sources = fields.next().map_or_else(SourceTags::new, |f| SourceTags::parse(f.as_bytes()));

        let tokens: Vec<String> = token_list.split(' ')
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect();
        if tokens.is_empty() {
            return Err(StructureError::EmptyTokens)
        }
        for token in &tokens {
            if !usld::is_representation(token) {
                return Err(StructureError::BadToken(token.clone()))
            }
        }
        let signature = tokens.concat();

        let probability = hexfloat::parse(probability_text).map_err(StructureError::BadProbability)?;
        if probability <= 0.0 {
            return Err(StructureError::NonPositiveProbability)
        }
        Ok(Structure{tokens, signature, probability, sources})
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    #[must_use]
    pub fn sources(&self) -> &SourceTags {
        &self.sources
    }

    /// Split a password positionally according to the token lengths.
    /// `None` when the total length differs from the signature length.
    #[must_use]
    pub fn split<'a>(&self, password: &'a [u8]) -> Option<Vec<&'a [u8]>> {
        if password.len() != self.signature.len() {
            return None
        }
        let mut pieces = Vec::with_capacity(self.tokens.len());
        let mut start = 0usize;
        for token in &self.tokens {
            let end = start + token.len();
            pieces.push(&password[start..end]);
            start = end;
        }
        Some(pieces)
    }
}
