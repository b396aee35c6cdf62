use num::ToPrimitive;
use thiserror::Error;

/// Arbitrary-precision nonnegative counter.
///
/// Unseen terminal groups reach sizes like 26^16, so every string count and
/// cumulative guess count in the engine is carried as a [`num::BigUint`].
/// Narrowing to a machine integer happens only at boundaries where the caller
/// asserts a bounded magnitude, through [`to_u64`].
pub type Count = num::BigUint;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CountError {
    #[error("Count {0} exceeds the u64 range")]
    Overflow(Count),
}

/// Checked narrowing of a [`Count`] to `u64`.
///
/// # Errors
/// [`CountError::Overflow`] when the value exceeds 2^64 - 1; this signals a
/// grammar beyond the supported scale for the requested operation.
pub fn to_u64(count: &Count) -> Result<u64, CountError> {
    count.to_u64().ok_or_else(|| CountError::Overflow(count.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_in_range() {
        assert_eq!(to_u64(&Count::from(0u64)).unwrap(), 0);
        assert_eq!(to_u64(&Count::from(u64::MAX)).unwrap(), u64::MAX);
    }

    #[test]
    fn narrow_overflow() {
        let too_big = Count::from(u64::MAX) + 1u64;
        assert_eq!(to_u64(&too_big), Err(CountError::Overflow(too_big.clone())));
    }
}
