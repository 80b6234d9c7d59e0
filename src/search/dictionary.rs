use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Common passwords in the order they are tried, most likely first
pub const COMMON_PASSWORDS: &[&str] = &[
    "1234",
    "0000",
    "1111",
    "123456",
    "password",
    "admin",
    "root",
    "12345678",
    "123456789",
    "love",
    "test",
    "pass",
    "123123",
    "asdf",
    "qwerty",
    "2024",
    "2025",
    "2026",
    "2023",
    "korea",
    "korean",
    "ko-KR",
    "koKR",
    "4072",
];

/// Ordered list of literal candidates for the dictionary stage
///
/// Insertion order is trial order. Sources are combined in priority order:
/// 1. Built-in common passwords (optional)
/// 2. Wordlist file (one password per line)
///
/// Duplicates keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordList {
    passwords: Vec<String>,
}

impl PasswordList {
    /// The built-in common passwords only
    pub fn builtin() -> Self {
        Self::from_passwords(COMMON_PASSWORDS.iter().copied())
    }

    /// Build a list from literal passwords, keeping first occurrences
    pub fn from_passwords<I, S>(passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        let mut seen = HashSet::new();
        for pw in passwords {
            list.push_unique(pw.into(), &mut seen);
        }
        list
    }

    /// Collect passwords from the built-in list and an optional wordlist file
    ///
    /// Wordlist lines are trimmed; blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the wordlist file cannot be read.
    pub async fn collect(include_builtin: bool, wordlist: Option<&Path>) -> Result<Self> {
        let mut list = Self::default();
        let mut seen = HashSet::new();

        if include_builtin {
            for pw in COMMON_PASSWORDS {
                list.push_unique((*pw).to_string(), &mut seen);
            }
        }

        if let Some(path) = wordlist {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| Error::Config {
                    message: format!("failed to read wordlist {}: {}", path.display(), e),
                    key: Some("dictionary.wordlist".into()),
                })?;
            for line in content.lines() {
                let pw = line.trim();
                if !pw.is_empty() {
                    list.push_unique(pw.to_string(), &mut seen);
                }
            }
        }

        debug!("collected {} unique dictionary passwords", list.len());

        Ok(list)
    }

    fn push_unique(&mut self, pw: String, seen: &mut HashSet<String>) {
        if seen.insert(pw.clone()) {
            self.passwords.push(pw);
        }
    }

    /// Iterate passwords in trial order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.passwords.iter().map(String::as_str)
    }

    /// Check if there are any passwords to try
    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }

    /// Get the number of passwords
    pub fn len(&self) -> usize {
        self.passwords.len()
    }
}
