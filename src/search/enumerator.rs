//! Odometer enumeration of fixed-length candidates

use super::alphabet::Alphabet;

/// Every string of one fixed length over an [`Alphabet`], each exactly once
///
/// Works like an odometer over mixed-radix digits: the rightmost position advances
/// fastest and carries leftward, so for alphabet `"01"` and length 2 the sequence is
/// `00, 01, 10, 11`. Mapping each character to its index in the alphabet, the output
/// is strictly increasing.
///
/// The sequence is lazy and finite (`k^n` items for an alphabet of `k` characters)
/// and cannot be restarted; build a new one per length.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    alphabet: &'a [char],
    indices: Vec<usize>,
    exhausted: bool,
}

impl<'a> Combinations<'a> {
    /// Start enumerating candidates of exactly `length` characters
    ///
    /// # Panics
    ///
    /// Panics if `length` is 0.
    pub fn new(alphabet: &'a Alphabet, length: usize) -> Self {
        assert!(length >= 1, "candidate length must be at least 1");
        Self {
            alphabet: alphabet.chars(),
            indices: vec![0; length],
            exhausted: alphabet.is_empty(),
        }
    }

    fn current(&self) -> String {
        self.indices.iter().map(|&i| self.alphabet[i]).collect()
    }

    /// Advance the rightmost digit, carrying left. Returns false once the carry
    /// runs off the first position.
    fn advance(&mut self) -> bool {
        let radix = self.alphabet.len();
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < radix {
                return true;
            }
            self.indices[pos] = 0;
        }
        false
    }
}

impl Iterator for Combinations<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        let candidate = self.current();
        if !self.advance() {
            self.exhausted = true;
        }
        Some(candidate)
    }
}

impl std::iter::FusedIterator for Combinations<'_> {}
