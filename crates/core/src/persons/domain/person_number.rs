use std::fmt;

use thiserror::Error;

use crate::shared::constants::PERSON_DIR_PREFIX;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NumberingError {
    #[error("person directory {0} has a number too large to continue from")]
    TooLarge(String),
    #[error("no person numbers left after {0}")]
    Exhausted(PersonNumber),
}

/// The numeric suffix of a `person<N>` output directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonNumber(u64);

impl PersonNumber {
    pub const FIRST: PersonNumber = PersonNumber(1);
    pub const MAX: PersonNumber = PersonNumber(u64::MAX);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parses a directory name of the form `person<digits>`.
    ///
    /// Zero padding is accepted (`person003` is 3). Anything else, including
    /// a bare `person` or trailing non-digits, is `Ok(None)`. A well-formed
    /// name whose number does not fit is an error, not a skipped entry.
    pub fn parse_dir_name(name: &str) -> Result<Option<Self>, NumberingError> {
        let Some(digits) = name.strip_prefix(PERSON_DIR_PREFIX) else {
            return Ok(None);
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(None);
        }
        digits
            .parse()
            .map(|n| Some(Self(n)))
            .map_err(|_| NumberingError::TooLarge(name.to_string()))
    }

    /// The number to use after existing directories up to `highest`.
    pub fn next_after(highest: Option<PersonNumber>) -> Result<Self, NumberingError> {
        match highest {
            None => Ok(Self::FIRST),
            Some(n) => n.offset(1),
        }
    }

    /// The number `offset` places after this one.
    pub fn offset(&self, offset: usize) -> Result<Self, NumberingError> {
        u64::try_from(offset)
            .ok()
            .and_then(|o| self.0.checked_add(o))
            .map(Self)
            .ok_or(NumberingError::Exhausted(*self))
    }

    pub fn dir_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PersonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PERSON_DIR_PREFIX}{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("person1", Some(1))]
    #[case("person42", Some(42))]
    #[case("person003", Some(3))]
    #[case("person0", Some(0))]
    #[case("person99999999999", Some(99_999_999_999))]
    #[case("person18446744073709551615", Some(u64::MAX))]
    #[case("person", None)]
    #[case("person2b", None)]
    #[case("Person4", None)]
    #[case("people7", None)]
    #[case("person-1", None)]
    fn test_parse_dir_name(#[case] name: &str, #[case] expected: Option<u64>) {
        assert_eq!(
            PersonNumber::parse_dir_name(name),
            Ok(expected.map(PersonNumber::new))
        );
    }

    #[test]
    fn test_parse_dir_name_beyond_u64_is_error() {
        let name = "person18446744073709551616";
        assert_eq!(
            PersonNumber::parse_dir_name(name),
            Err(NumberingError::TooLarge(name.to_string()))
        );
    }

    #[test]
    fn test_next_after_none_is_first() {
        assert_eq!(PersonNumber::next_after(None), Ok(PersonNumber::new(1)));
    }

    #[rstest]
    #[case(3, 4)]
    #[case(0, 1)]
    #[case(4_294_967_295, 4_294_967_296)]
    fn test_next_after_existing(#[case] highest: u64, #[case] expected: u64) {
        assert_eq!(
            PersonNumber::next_after(Some(PersonNumber::new(highest))),
            Ok(PersonNumber::new(expected))
        );
    }

    #[test]
    fn test_next_after_max_is_exhausted() {
        assert_eq!(
            PersonNumber::next_after(Some(PersonNumber::MAX)),
            Err(NumberingError::Exhausted(PersonNumber::MAX))
        );
    }

    #[test]
    fn test_offset_past_max_is_exhausted() {
        let start = PersonNumber::new(u64::MAX - 1);
        assert_eq!(start.offset(1), Ok(PersonNumber::MAX));
        assert_eq!(start.offset(2), Err(NumberingError::Exhausted(start)));
    }

    #[test]
    fn test_dir_name_is_unpadded() {
        assert_eq!(
            PersonNumber::new(7).offset(5).unwrap().dir_name(),
            "person12"
        );
    }
}
