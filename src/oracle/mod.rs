//! Password verification against a target archive
//!
//! The search engine never opens the target itself. It hands each candidate to a
//! [`PasswordOracle`], which owns the target and answers whether the candidate
//! unlocks it.

use async_trait::async_trait;

use crate::error::OracleError;

mod zip;

pub use self::zip::ZipOracle;

/// Verifies candidate passwords against one target
///
/// Implementations must be read-only with respect to the target: testing the same
/// candidate twice gives the same answer. The search calls [`test`](Self::test)
/// one candidate at a time, never concurrently within a session.
///
/// # Examples
///
/// ```no_run
/// use pwsearch::oracle::{PasswordOracle, ZipOracle};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let oracle = ZipOracle::open(Path::new("secret.zip")).await?;
/// if oracle.test("hunter2").await? {
///     println!("unlocked");
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait PasswordOracle: Send + Sync {
    /// Check a single candidate
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the candidate unlocks the target, `Ok(false)` if it does not.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] when the target cannot be read at all (I/O failure,
    /// corrupt or unsupported archive). The session stops on the first error.
    async fn test(&self, candidate: &str) -> Result<bool, OracleError>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}
