//! Core types for pwsearch

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, OracleError};

/// Identifies one of the three search stages, in priority order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Curated list of common passwords plus an optional wordlist
    Dictionary,
    /// Brute force over the numeric alphabet
    Numeric,
    /// Brute force over the alphanumeric alphabet
    Alphanumeric,
}

impl StageId {
    /// Human-readable name used in progress labels and logs
    pub fn label(&self) -> &'static str {
        match self {
            StageId::Dictionary => "common passwords",
            StageId::Numeric => "numeric",
            StageId::Alphanumeric => "alphanumeric",
        }
    }

    /// Name of this stage's section in [`SearchConfig`](crate::config::SearchConfig)
    pub fn config_key(&self) -> &'static str {
        match self {
            StageId::Dictionary => "dictionary",
            StageId::Numeric => "numeric",
            StageId::Alphanumeric => "alphanumeric",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal result of running one stage (or a whole session)
///
/// A stage never resumes after producing one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageResult {
    /// The oracle accepted this candidate
    Found(String),
    /// Every candidate was tried without a match
    Exhausted,
    /// The cancellation token was observed at a checkpoint
    Cancelled,
    /// The oracle failed; no further candidates were tried
    OracleError(OracleError),
}

impl StageResult {
    /// Serializable kind of this result, without its payload
    pub fn kind(&self) -> OutcomeKind {
        match self {
            StageResult::Found(_) => OutcomeKind::Found,
            StageResult::Exhausted => OutcomeKind::Exhausted,
            StageResult::Cancelled => OutcomeKind::Cancelled,
            StageResult::OracleError(_) => OutcomeKind::OracleError,
        }
    }

    /// The matching password, if any
    pub fn password(&self) -> Option<&str> {
        match self {
            StageResult::Found(pw) => Some(pw),
            _ => None,
        }
    }

    /// True for every result except [`StageResult::Exhausted`]
    ///
    /// A session stops at the first terminal stage result.
    pub fn ends_session(&self) -> bool {
        !matches!(self, StageResult::Exhausted)
    }
}

/// Result kind as carried by events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Password found
    Found,
    /// Search space exhausted
    Exhausted,
    /// Cancelled by the caller
    Cancelled,
    /// Oracle failure
    OracleError,
}

/// Aggregate result of a search session
#[must_use]
#[derive(Clone, Debug)]
pub struct SessionResult {
    /// Result of the first stage that did not exhaust, or `Exhausted`
    pub outcome: StageResult,
    /// Stage that produced `outcome` (None when every stage exhausted)
    pub stage: Option<StageId>,
    /// Oracle calls made across all stages
    pub attempts: u64,
    /// Time from the first stage starting to the terminal event
    pub elapsed: Duration,
}

impl SessionResult {
    /// The matching password, if any
    pub fn password(&self) -> Option<&str> {
        self.outcome.password()
    }

    /// Process exit code a front-end should use for this outcome
    ///
    /// 0 found, 1 cancelled, 2 exhausted, 3 oracle error.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            StageResult::Found(_) => 0,
            StageResult::Cancelled => 1,
            StageResult::Exhausted => 2,
            StageResult::OracleError(_) => 3,
        }
    }

    /// Split into the password (if found) or the oracle failure
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] when the session ended on an oracle failure.
    pub fn into_result(self) -> Result<Option<String>, Error> {
        match self.outcome {
            StageResult::Found(pw) => Ok(Some(pw)),
            StageResult::Exhausted | StageResult::Cancelled => Ok(None),
            StageResult::OracleError(e) => Err(Error::Oracle(e)),
        }
    }
}

/// Progress snapshot for the running stage
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Stage being run
    pub stage: StageId,
    /// Human label (current candidate for the dictionary, length summary for brute force)
    pub label: String,
    /// Candidates tested so far in this stage
    pub tested: u64,
    /// Candidates known to this stage so far
    ///
    /// For brute force this accumulates the totals of every length started so far.
    pub total: u64,
    /// `tested / total` as a percentage (0.0 to 100.0)
    pub percent: f32,
}

impl ProgressEvent {
    /// Build an event, computing the percentage
    pub fn new(stage: StageId, label: impl Into<String>, tested: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            (tested as f64 / total as f64 * 100.0) as f32
        };
        Self {
            stage,
            label: label.into(),
            tested,
            total,
            percent,
        }
    }
}

/// Event emitted during a search session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Session started with these stages, in run order
    SessionStarted {
        /// Enabled stages
        stages: Vec<StageId>,
    },

    /// A stage started
    StageStarted {
        /// Stage starting
        stage: StageId,
        /// Candidates the stage will try if nothing matches
        total: u64,
    },

    /// A brute-force stage moved on to a new candidate length
    LengthStarted {
        /// Stage running
        stage: StageId,
        /// Candidate length now being enumerated
        length: usize,
        /// Number of candidates of this length
        combinations: u64,
    },

    /// Progress update
    Progress(ProgressEvent),

    /// A stage reached a terminal result
    StageFinished {
        /// Stage that finished
        stage: StageId,
        /// How it finished
        outcome: OutcomeKind,
        /// Oracle calls made by this stage
        attempts: u64,
    },

    /// The session finished
    SessionFinished {
        /// How it finished
        outcome: OutcomeKind,
        /// The password, when found
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        /// Oracle calls made across all stages
        attempts: u64,
        /// Elapsed time in milliseconds
        elapsed_ms: u64,
    },
}

/// Informational metadata about a target archive
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    /// Number of entries in the archive
    pub entry_count: usize,
    /// Whether any entry is encrypted
    pub is_encrypted: bool,
    /// Names of the first few entries
    pub sample_names: Vec<String>,
}
