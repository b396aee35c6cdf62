use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Sentinel accepted by the parser and produced by [`emit`] for `-1.0`,
/// the on-disk marker for "no probability".
pub const SENTINEL: &str = "-1";

/// Fraction digits folded exactly into the accumulator; 27 nibbles + the
/// leading bit stay within `u128`. Further digits only contribute a sticky bit.
const MAX_FRACTION_DIGITS: usize = 27;

lazy_static! {
    static ref HEX_FLOAT: Regex = Regex::new(
        r"^(?P<sign>[+-])?(?:0[xX])?(?P<lead>[01])(?:\.(?P<frac>[0-9a-fA-F]+))?[pP](?P<exp>[+-]?[0-9]+)$"
    ).expect("hardcoded hex-float regex must compile");
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexFloatError {
    #[error("'{0}' is not a valid hexadecimal float")]
    Syntax(String),

    #[error("Exponent of '{0}' is out of range")]
    ExponentRange(String),

    #[error("'{0}' overflows the double range")]
    Overflow(String),

    #[error("'{0}' underflows to zero")]
    Underflow(String),
}

/// Parse an IEEE-754 double from hexadecimal floating-point notation
/// `[+-]?(0x)?[01].MMMMp[+-]E` (the leading `0x` and the fraction may be
/// absent), or the `-1` sentinel.
///
/// The mantissa is accumulated as an integer and scaled by exact powers of
/// two, so any value produced by [`emit`] parses back bit-identically.
pub fn parse(text: &str) -> Result<f64, HexFloatError> {
    if text == SENTINEL {
        return Ok(-1.0)
    }
    let captures = HEX_FLOAT.captures(text)
        .ok_or_else(|| HexFloatError::Syntax(text.to_string()))?;

    let negative = captures.name("sign").is_some_and(|m| m.as_str() == "-");
    let mut mantissa: u128 = u128::from(captures["lead"] == *"1");
    let mut folded = 0usize;
    let mut sticky = false;
    if let Some(fraction) = captures.name("frac") {
        for byte in fraction.as_str().bytes() {
            let digit = u128::from((byte as char).to_digit(16).expect("regex admits hex digits only"));
            if folded < MAX_FRACTION_DIGITS {
                mantissa = (mantissa << 4) | digit;
                folded += 1;
            } else if digit != 0 {
                sticky = true; // beyond double precision anyway; keep the round bit honest
            }
        }
    }
    if sticky {
        mantissa |= 1;
    }

    let exponent: i32 = captures["exp"].parse()
        .map_err(|_| HexFloatError::ExponentRange(text.to_string()))?;

    let magnitude = scale_exp2(mantissa as f64, exponent - 4 * folded as i32);
    if magnitude.is_infinite() {
        return Err(HexFloatError::Overflow(text.to_string()))
    }
    if magnitude == 0.0 && mantissa != 0 {
        return Err(HexFloatError::Underflow(text.to_string()))
    }
    Ok(if negative { -magnitude } else { magnitude })
}

/// Emit the canonical form `0x1.MMMMp±E` (subnormals as `0x0.MMMMp-1022`,
/// trailing mantissa zeros trimmed). `-1.0` emits the `-1` sentinel.
///
/// # Panics
/// On NaN or infinite input: those never denote a probability.
#[must_use]
pub fn emit(value: f64) -> String {
    assert!(value.is_finite(), "cannot emit a non-finite probability");
    if value == -1.0 {
        return String::from(SENTINEL)
    }
    let bits = value.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);

    if biased == 0 && fraction == 0 {
        return format!("{sign}0x0.0p+0")
    }
    let (lead, exponent) = match biased {
        0 => ('0', -1022),
        _ => ('1', biased - 1023),
    };
    let mut digits = format!("{fraction:013x}");
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    format!("{sign}0x{lead}.{digits}p{exponent:+}")
}

/// Exact `2^exponent` for `exponent` in `[-1022, 1023]`.
fn exp2i(exponent: i32) -> f64 {
    debug_assert!((-1022..=1023).contains(&exponent));
    f64::from_bits(((exponent + 1023) as u64) << 52)
}

/// Multiply by `2^exponent` using exact power-of-two factors, chunked so every
/// factor is a normal double.
fn scale_exp2(value: f64, exponent: i32) -> f64 {
    let mut scaled = value;
    let mut remaining = exponent;
    while remaining > 0 && scaled.is_finite() {
        let step = remaining.min(1023);
        scaled *= exp2i(step);
        remaining -= step;
    }
    while remaining < 0 && scaled != 0.0 {
        let step = remaining.max(-1022);
        scaled *= exp2i(step);
        remaining -= step;
    }
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_canonical_forms() {
        assert_eq!(parse("0x1.0p-1").unwrap(), 0.5);
        assert_eq!(parse("0x1.0p+0").unwrap(), 1.0);
        assert_eq!(parse("0x1.8p+1").unwrap(), 3.0);
        assert_eq!(parse("0x1p+2").unwrap(), 4.0);
    }

    #[test]
    fn parse_without_hex_prefix() {
        assert_eq!(parse("1.8p-1").unwrap(), 0.75);
        assert_eq!(parse("-1.0p-2").unwrap(), -0.25);
        assert_eq!(parse("+1.0p-2").unwrap(), 0.25);
    }

    #[test]
    fn parse_sentinel() {
        assert_eq!(parse("-1").unwrap(), -1.0);
        assert_eq!(emit(-1.0), "-1");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "0x2.0p+0", "0x1.0", "1.0e-3", "0x1.zp+0", "cat"] {
            assert!(matches!(parse(bad), Err(HexFloatError::Syntax(_))), "accepted {bad:?}");
        }
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert!(matches!(parse("0x1.0p+99999999999"), Err(HexFloatError::ExponentRange(_))));
        assert!(matches!(parse("0x1.0p+2000"), Err(HexFloatError::Overflow(_))));
        assert!(matches!(parse("0x1.0p-2000"), Err(HexFloatError::Underflow(_))));
    }

    #[test]
    fn emit_canonical_forms() {
        assert_eq!(emit(0.5), "0x1.0p-1");
        assert_eq!(emit(1.0), "0x1.0p+0");
        assert_eq!(emit(3.0), "0x1.8p+1");
        assert_eq!(emit(0.0), "0x0.0p+0");
    }

    #[test]
    fn subnormal_round_trip() {
        let smallest = f64::from_bits(1);
        assert_eq!(parse(&emit(smallest)).unwrap().to_bits(), 1);

        let subnormal = f64::from_bits(0x000f_ffff_ffff_ffff);
        assert_eq!(parse(&emit(subnormal)).unwrap().to_bits(), subnormal.to_bits());
    }

    /// parse(emit(d)) == d bitwise, for random finite doubles.
    #[test]
    fn round_trip_random_doubles() {
        let mut rng = fastrand::Rng::with_seed(0xf10a7);
        for _ in 0..2000 {
            let fraction = rng.u64(..) & ((1u64 << 52) - 1);
            let biased = rng.u64(0..2047); // excludes inf/nan
            let sign = u64::from(rng.bool()) << 63;
            let value = f64::from_bits(sign | (biased << 52) | fraction);
            if value == -1.0 {
                continue // sentinel collides with the canonical form on purpose
            }
            assert_eq!(parse(&emit(value)).unwrap().to_bits(), value.to_bits(), "value: {value:e}");
        }
    }
}
