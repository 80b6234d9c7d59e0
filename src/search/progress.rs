//! Progress reporting and cancellation checkpoints
//!
//! [`SearchContext`] bundles what a running stage needs from the outside world:
//! the oracle, the cancellation token, and the sink receiving [`Event`]s. It also
//! counts oracle calls so the session can report attempts per stage.

use crate::error::OracleError;
use crate::oracle::PasswordOracle;
use crate::types::Event;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Receives search events
///
/// Called on the search's own control flow, once per batch at most for brute
/// force, so implementations must return quickly and never wait on a consumer.
pub trait ProgressSink: Send + Sync {
    /// Deliver one event
    fn emit(&self, event: Event);
}

/// Broadcasting to subscribers; lagging or absent subscribers never block the search
impl ProgressSink for broadcast::Sender<Event> {
    fn emit(&self, event: Event) {
        // Err only means nobody is subscribed right now
        let _ = self.send(event);
    }
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: Event) {}
}

/// Handles a stage uses while running
pub struct SearchContext<'a> {
    oracle: &'a dyn PasswordOracle,
    cancel: &'a CancellationToken,
    sink: &'a dyn ProgressSink,
    attempts: u64,
}

impl<'a> SearchContext<'a> {
    /// Bundle the collaborators for one session
    pub fn new(
        oracle: &'a dyn PasswordOracle,
        cancel: &'a CancellationToken,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            oracle,
            cancel,
            sink,
            attempts: 0,
        }
    }

    /// Pass one candidate to the oracle
    pub async fn try_candidate(&mut self, candidate: &str) -> Result<bool, OracleError> {
        self.attempts += 1;
        self.oracle.test(candidate).await
    }

    /// Cancellation checkpoint
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Forward an event to the sink
    pub fn emit(&self, event: Event) {
        self.sink.emit(event);
    }

    /// Let other tasks on the runtime make progress between candidates
    pub async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }

    /// Oracle calls made through this context so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Name of the oracle, for logging
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }
}

/// Format a count with thousands separators, e.g. `46,656`
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
