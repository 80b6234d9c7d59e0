//! Ordered candidate character sets

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal digits, in ascending order
pub const DIGITS: &str = "0123456789";

/// Lowercase ASCII letters followed by decimal digits
pub const LOWER_ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Ordered set of unique characters a brute-force stage draws candidates from
///
/// The order of the characters is the enumeration order: the first character acts
/// as digit 0, the second as digit 1, and so on. It is independent of how the
/// characters compare as text, so `"ba"` enumerates `b` before `a`.
///
/// Serialized as a plain string. Deserialization rejects empty strings and strings
/// with repeated characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Create an alphabet from a string of unique characters
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `chars` is empty or repeats a character.
    /// Use [`Alphabet::deduplicated`] to accept arbitrary input instead.
    pub fn new(chars: &str) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::with_capacity(chars.len());
        for c in chars.chars() {
            if !seen.insert(c) {
                return Err(Error::config(
                    "alphabet",
                    format!("alphabet {chars:?} repeats the character {c:?}"),
                ));
            }
            out.push(c);
        }
        if out.is_empty() {
            return Err(Error::config("alphabet", "alphabet must not be empty"));
        }
        Ok(Self { chars: out })
    }

    /// Create an alphabet keeping only the first occurrence of each character
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `chars` is empty.
    pub fn deduplicated(chars: &str) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        let unique: String = chars.chars().filter(|c| seen.insert(*c)).collect();
        Self::new(&unique)
    }

    /// The digits `0-9`
    #[must_use]
    pub fn numeric() -> Self {
        Self {
            chars: DIGITS.chars().collect(),
        }
    }

    /// Lowercase letters and digits, `a-z0-9`
    #[must_use]
    pub fn lower_alphanumeric() -> Self {
        Self {
            chars: LOWER_ALPHANUMERIC.chars().collect(),
        }
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; an alphabet holds at least one character
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in enumeration order
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Position of `c` in the enumeration order
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.chars.iter().position(|&x| x == c)
    }

    /// Number of distinct candidates of exactly `length` characters
    ///
    /// Saturates at `u64::MAX` for search spaces too large to count.
    pub fn combinations(&self, length: usize) -> u64 {
        let exp = u32::try_from(length).unwrap_or(u32::MAX);
        (self.chars.len() as u64).saturating_pow(exp)
    }

    /// Number of candidates of every length from 1 up to and including `max_length`
    pub fn combinations_up_to(&self, max_length: usize) -> u64 {
        (1..=max_length).fold(0u64, |acc, len| acc.saturating_add(self.combinations(len)))
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Alphabet {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Alphabet> for String {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.to_string()
    }
}
