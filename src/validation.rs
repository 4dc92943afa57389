//! Parsing and range checking of the user-supplied digit.

use std::{fmt, num::IntErrorKind};

use thiserror::Error;

/// Lowest and highest digit class the generator was trained on.
pub const MIN_DIGIT: u8 = 0;
pub const MAX_DIGIT: u8 = 9;

/// A digit class in `[0, 9]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDigit(u8);

impl TargetDigit {
    pub fn value(self) -> u8 {
        self.0
    }

    /// Conditioning label as fed to the generator.
    pub fn label(self) -> i64 {
        i64::from(self.0)
    }
}

impl fmt::Display for TargetDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for TargetDigit {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|digit| (MIN_DIGIT..=MAX_DIGIT).contains(digit))
            .map(TargetDigit)
            .ok_or_else(|| ValidationError::OutOfRange(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Given input {0} is not an integer.")]
    NotAnInteger(String),
    #[error("Given input is not in the range 0 to 9")]
    OutOfRange(String),
}

/// Parses `raw` as an ASCII base-10 integer and checks it names a digit class.
///
/// Surrounding whitespace and a leading sign are accepted; digit separators
/// and non-ASCII digits are not. Integers too large to represent are reported
/// as out of range rather than as non-integers.
pub fn validate(raw: &str) -> Result<TargetDigit, ValidationError> {
    let value = match raw.trim().parse::<i64>() {
        Ok(value) => value,
        Err(err) => {
            return Err(match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ValidationError::OutOfRange(raw.to_string())
                }
                _ => ValidationError::NotAnInteger(raw.to_string()),
            });
        }
    };

    TargetDigit::try_from(value).map_err(|_| ValidationError::OutOfRange(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_digit() {
        for digit in 0..=9u8 {
            let parsed = validate(&digit.to_string()).unwrap();
            assert_eq!(parsed.value(), digit);
        }
    }

    #[test]
    fn tolerates_whitespace_and_sign() {
        assert_eq!(validate(" 7\n").unwrap().value(), 7);
        assert_eq!(validate("+3").unwrap().value(), 3);
        assert_eq!(validate("-0").unwrap().value(), 0);
    }

    #[test]
    fn non_integer_message_embeds_raw_input() {
        let err = validate("abc").unwrap_err();
        assert_eq!(err, ValidationError::NotAnInteger("abc".into()));
        assert_eq!(err.to_string(), "Given input abc is not an integer.");
    }

    #[test]
    fn empty_and_fractional_inputs_are_not_integers() {
        assert!(matches!(validate(""), Err(ValidationError::NotAnInteger(_))));
        assert!(matches!(validate("4.0"), Err(ValidationError::NotAnInteger(_))));
        assert!(matches!(validate("0x5"), Err(ValidationError::NotAnInteger(_))));
    }

    #[test]
    fn only_ascii_digits_without_separators_parse() {
        for raw in ["0_5", "\u{0665}", "\u{FF15}"] {
            let err = validate(raw).unwrap_err();
            assert_eq!(err, ValidationError::NotAnInteger(raw.to_string()));
        }
    }

    #[test]
    fn out_of_range_message_is_fixed() {
        let err = validate("42").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange(_)));
        assert_eq!(err.to_string(), "Given input is not in the range 0 to 9");
        assert!(matches!(validate("-1"), Err(ValidationError::OutOfRange(_))));
    }

    #[test]
    fn huge_integers_are_out_of_range() {
        let err = validate("123456789012345678901234567890").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange(_)));
    }

    #[test]
    fn try_from_applies_the_same_range() {
        assert_eq!(TargetDigit::try_from(9).unwrap().label(), 9);
        assert!(TargetDigit::try_from(10).is_err());
        assert!(TargetDigit::try_from(-3).is_err());
        assert!(TargetDigit::try_from(256).is_err());
    }
}
