//! # pwsearch
//!
//! Staged password search for encrypted archives.
//!
//! A search session tries candidate passwords against one target in a fixed
//! order until one unlocks it, the configured search space runs out, or the
//! caller cancels:
//! 1. **Dictionary** - curated common passwords, then an optional wordlist
//! 2. **Numeric brute force** - every digit string, shortest first
//! 3. **Alphanumeric brute force** - every `a-z0-9` string, shortest first
//!
//! Verification is delegated to a [`PasswordOracle`]; [`ZipOracle`] checks ZIP
//! archives. Progress is reported as [`Event`]s through a [`ProgressSink`], and
//! cancellation is cooperative through a [`CancellationToken`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use pwsearch::{Event, SearchConfig, ZipOracle, run_search};
//! use std::path::Path;
//! use tokio::sync::broadcast;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let oracle = ZipOracle::open(Path::new("secret.zip")).await?;
//!     let (events, mut rx) = broadcast::channel::<Event>(256);
//!     tokio::spawn(async move {
//!         while let Ok(event) = rx.recv().await {
//!             println!("{:?}", event);
//!         }
//!     });
//!
//!     let cancel = CancellationToken::new();
//!     let result = run_search(&SearchConfig::default(), &oracle, &cancel, &events).await?;
//!     match result.password() {
//!         Some(pw) => println!("password: {pw} ({:?})", result.elapsed),
//!         None => println!("not found: {:?}", result.outcome),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Password verification
pub mod oracle;
/// Staged search engine
pub mod search;
/// Core types and events
pub mod types;

use tokio_util::sync::CancellationToken;

// Re-export commonly used types
pub use config::{BruteForceConfig, DictionaryConfig, SearchConfig};
pub use error::{Error, OracleError, Result};
pub use oracle::{PasswordOracle, ZipOracle};
pub use search::{
    Alphabet, NoProgress, PasswordList, ProgressSink, SearchSession, Stage, run_search,
};
pub use types::{
    ArchiveInfo, Event, OutcomeKind, ProgressEvent, SessionResult, StageId, StageResult,
};

/// Cancel `token` when the process receives a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Returns early, without cancelling, if the token is cancelled by someone else.
///
/// # Example
///
/// ```no_run
/// use pwsearch::{SearchConfig, ZipOracle, NoProgress, cancel_on_signal, run_search};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let oracle = ZipOracle::open("secret.zip".as_ref()).await?;
///     let cancel = CancellationToken::new();
///     tokio::spawn(cancel_on_signal(cancel.clone()));
///
///     let result = run_search(&SearchConfig::default(), &oracle, &cancel, &NoProgress).await?;
///     std::process::exit(result.exit_code());
/// }
/// ```
pub async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        signal = wait_for_signal() => {
            tracing::info!(signal, "cancelling password search");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}

/// Wait for a termination signal and return its name
#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments; fall back to ctrl_c
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        },
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "signal handler registration failed, search stops on Ctrl+C only");
            wait_for_ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl+C, search can only be cancelled by its token");
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
