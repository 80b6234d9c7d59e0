//! Staged password search
//!
//! A session runs up to three stages against one target, in priority order:
//! 1. Dictionary: curated common passwords, then an optional wordlist
//! 2. Numeric brute force: every digit string, shortest first
//! 3. Alphanumeric brute force: every `a-z0-9` string, shortest first
//!
//! Brute-force candidates come from [`Combinations`], an odometer over the stage's
//! [`Alphabet`]. Candidates are tested one at a time; progress events and
//! cancellation checks happen once per batch of [`BATCH_SIZE`] brute-force
//! candidates and once per dictionary candidate.

pub mod alphabet;
mod dictionary;
mod enumerator;
mod progress;
mod session;
mod stage;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

// Re-exports
pub use alphabet::{Alphabet, DIGITS, LOWER_ALPHANUMERIC};
pub use dictionary::{COMMON_PASSWORDS, PasswordList};
pub use enumerator::Combinations;
pub use progress::{NoProgress, ProgressSink, SearchContext, format_count};
pub use session::{SearchSession, run_search};
pub use stage::{BATCH_SIZE, Stage};
