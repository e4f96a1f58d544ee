//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a disallowed character.
    #[error("phone number may only contain digits, spaces, hyphens, parentheses, and a leading +")]
    InvalidCharacter,
    /// The input contains no digits at all.
    #[error("phone number must contain at least one digit")]
    NoDigits,
}

/// A loosely-validated phone number.
///
/// Accepts an optional leading `+` followed by digits, spaces, hyphens, and
/// parentheses. This is a format check, not a carrier-level validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Maximum length of a phone number.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `PhoneNumber` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains characters
    /// outside the allowed set, or contains no digits.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PhoneNumberError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        for (i, c) in s.chars().enumerate() {
            let allowed = c.is_ascii_digit()
                || c == ' '
                || c == '-'
                || c == '('
                || c == ')'
                || (c == '+' && i == 0);
            if !allowed {
                return Err(PhoneNumberError::InvalidCharacter);
            }
        }

        if !s.chars().any(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::NoDigits);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(PhoneNumber::parse("+1 (555) 867-5309").is_ok());
        assert!(PhoneNumber::parse("555 867 5309").is_ok());
        assert!(PhoneNumber::parse("5558675309").is_ok());
    }

    #[test]
    fn test_parse_trims() {
        let phone = PhoneNumber::parse("  +44 20 7946 0958 ").unwrap();
        assert_eq!(phone.as_str(), "+44 20 7946 0958");
    }

    #[test]
    fn test_parse_rejects_letters() {
        assert!(matches!(
            PhoneNumber::parse("CALL-ME"),
            Err(PhoneNumberError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_rejects_interior_plus() {
        assert!(matches!(
            PhoneNumber::parse("555+867"),
            Err(PhoneNumberError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_requires_digits() {
        assert!(matches!(
            PhoneNumber::parse("+()"),
            Err(PhoneNumberError::NoDigits)
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            PhoneNumber::parse("   "),
            Err(PhoneNumberError::Empty)
        ));
    }
}
