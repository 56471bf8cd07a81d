//! UK postcode grammar.

use crate::error::ValidationError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Outward code (A9, A99, AA9, AA99, A9A, AA9A or GIR), optional single space, inward code (9AA).
/// The second letter of a two-letter area never is I, J or Z.
static UK_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i-u)^(?:GIR ?0AA|(?:[A-Z][0-9]{1,2}|[A-Z][A-HJ-Y][0-9]{1,2}|[A-Z][0-9][A-Z]|[A-Z][A-HJ-Y][0-9][A-Z]?) ?[0-9][A-Z]{2})$",
    )
    .expect("postcode pattern is valid")
});

/// A postcode that passed the grammar, held in canonical `OUTWARD INWARD` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidPostcode(String);

impl ValidPostcode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidPostcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ValidPostcode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

/// Validate raw user input. Malformed input is an ordinary `Err`, never a panic.
pub fn validate(raw: &str) -> Result<ValidPostcode, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing);
    }
    let invalid = || ValidationError::Invalid { input: trimmed.to_string() };
    // Case folding must not let look-alikes (Kelvin sign, long s) through.
    if !trimmed.is_ascii() || !UK_POSTCODE.is_match(trimmed) {
        return Err(invalid());
    }

    // Inward code is always the last three characters.
    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let split = compact
        .len()
        .checked_sub(3)
        .filter(|&i| compact.is_char_boundary(i))
        .ok_or_else(invalid)?;
    let (outward, inward) = compact.split_at(split);
    Ok(ValidPostcode(format!("{} {}", outward, inward)))
}
