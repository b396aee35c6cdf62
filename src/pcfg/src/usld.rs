use thiserror::Error;

/// Reserved tokenized-break byte. Passwords containing it are unparseable.
pub const BREAK_BYTE: u8 = 0x01;

/// Character class of a single password byte.
///
/// Every byte maps to exactly one class: ASCII uppercase, ASCII lowercase,
/// ASCII digit, or symbol (anything else, including non-ASCII bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Upper,
    Lower,
    Digit,
    Symbol,
}

impl CharClass {
    #[must_use]
    pub fn of(byte: u8) -> CharClass {
        match byte {
            b'A'..=b'Z' => CharClass::Upper,
            b'a'..=b'z' => CharClass::Lower,
            b'0'..=b'9' => CharClass::Digit,
            _           => CharClass::Symbol,
        }
    }

    /// One-letter code used in signatures and nonterminal representations.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            CharClass::Upper  => 'U',
            CharClass::Lower  => 'L',
            CharClass::Digit  => 'D',
            CharClass::Symbol => 'S',
        }
    }

    #[must_use]
    pub fn from_code(code: char) -> Option<CharClass> {
        match code {
            'U' => Some(CharClass::Upper),
            'L' => Some(CharClass::Lower),
            'D' => Some(CharClass::Digit),
            'S' => Some(CharClass::Symbol),
            _   => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsldError {
    #[error("Password contains the reserved break byte (0x01) at position {0}")]
    BreakByte(usize),
}

/// Character-wise class signature of a password, as a string over `ULSD`.
///
/// # Errors
/// Rejects any input containing [`BREAK_BYTE`].
pub fn signature(password: &[u8]) -> Result<String, UsldError> {
    let mut repr = String::with_capacity(password.len());
    for (position, byte) in password.iter().enumerate() {
        if *byte == BREAK_BYTE {
            return Err(UsldError::BreakByte(position))
        }
        repr.push(CharClass::of(*byte).code());
    }
    Ok(repr)
}

/// Check that a string is a valid nonterminal representation (non-empty, `ULSD` only).
#[must_use]
pub fn is_representation(repr: &str) -> bool {
    !repr.is_empty() && repr.chars().all(|c| CharClass::from_code(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_mapping() {
        assert_eq!(signature(b"Cat12!").unwrap(), "ULLDDS");
        assert_eq!(signature(b"").unwrap(), "");
        assert_eq!(signature("péz".as_bytes()).unwrap(), "LSSL"); // 'é' is two non-ASCII bytes
    }

    #[test]
    fn break_byte_rejected() {
        assert_eq!(signature(b"ab\x01cd"), Err(UsldError::BreakByte(2)));
    }

    #[test]
    fn representation_validation() {
        assert!(is_representation("ULLDDS"));
        assert!(!is_representation(""));
        assert!(!is_representation("L5"));
    }

    /// Synthesize a random signature, build a preimage from legal alphabets,
    /// and check the signature maps back onto itself.
    #[test]
    fn signature_idempotence() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..500 {
            let len = rng.usize(0..24);
            let expected: String = (0..len)
                .map(|_| ['U', 'L', 'D', 'S'][rng.usize(0..4)])
                .collect();
            let preimage: Vec<u8> = expected.chars().map(|code| {
                match code {
                    'U' => rng.u8(b'A'..=b'Z'),
                    'L' => rng.u8(b'a'..=b'z'),
                    'D' => rng.u8(b'0'..=b'9'),
                    _   => [b'!', b'@', b'~', b' ', 0xc3][rng.usize(0..5)],
                }
            }).collect();
            assert_eq!(signature(&preimage).unwrap(), expected);
        }
    }
}
