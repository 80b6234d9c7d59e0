//! Search session orchestration

use super::alphabet::Alphabet;
use super::dictionary::PasswordList;
use super::progress::{ProgressSink, SearchContext};
use super::stage::Stage;
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::oracle::PasswordOracle;
use crate::types::{Event, SessionResult, StageId, StageResult};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// An ordered list of stages run against one target
///
/// Stages run strictly in priority order (dictionary, numeric, alphanumeric).
/// The session stops at the first stage that finds the password, is cancelled,
/// or hits an oracle failure, and reports `Exhausted` only if every stage
/// exhausts.
///
/// # Example
///
/// ```
/// use pwsearch::search::{Alphabet, NoProgress, SearchSession, Stage};
/// use pwsearch::oracle::PasswordOracle;
/// use pwsearch::types::StageId;
/// use pwsearch::error::OracleError;
/// use tokio_util::sync::CancellationToken;
///
/// struct Known(&'static str);
///
/// #[async_trait::async_trait]
/// impl PasswordOracle for Known {
///     async fn test(&self, candidate: &str) -> Result<bool, OracleError> {
///         Ok(candidate == self.0)
///     }
///     fn name(&self) -> &str { "known" }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> pwsearch::Result<()> {
/// let session = SearchSession::new(vec![
///     Stage::brute_force(StageId::Numeric, Alphabet::new("01")?, 2),
/// ])?;
/// let result = session.run(&Known("10"), &CancellationToken::new(), &NoProgress).await;
/// assert_eq!(result.password(), Some("10"));
/// assert_eq!(result.attempts, 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SearchSession {
    stages: Vec<Stage>,
}

impl SearchSession {
    /// Build a session from explicit stages
    ///
    /// Stages are put into priority order; stages sharing an id keep their
    /// relative order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `stages` is empty, the dictionary stage has
    /// no passwords, or a brute-force stage has a `max_length` of 0 or carries
    /// the dictionary id.
    pub fn new(mut stages: Vec<Stage>) -> Result<Self> {
        if stages.is_empty() {
            return Err(Error::Config {
                message: "no search stage is enabled".into(),
                key: None,
            });
        }

        for stage in &stages {
            match stage {
                Stage::Dictionary { passwords } if passwords.is_empty() => {
                    return Err(Error::config(
                        StageId::Dictionary.config_key(),
                        "dictionary stage is enabled but has no passwords to try",
                    ));
                }
                Stage::BruteForce {
                    id: StageId::Dictionary,
                    ..
                } => {
                    return Err(Error::Config {
                        message: "a brute-force stage cannot use the dictionary stage id".into(),
                        key: None,
                    });
                }
                Stage::BruteForce { id, max_length, .. } if *max_length == 0 => {
                    return Err(Error::config(
                        format!("{}.max_length", id.config_key()),
                        format!("{id} stage is enabled but max_length is 0"),
                    ));
                }
                _ => {}
            }
        }

        stages.sort_by_key(Stage::id);
        Ok(Self { stages })
    }

    /// Build a session from configuration, loading the wordlist if one is set
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, the wordlist
    /// cannot be read, or the dictionary stage ends up with no passwords.
    pub async fn from_config(config: &SearchConfig) -> Result<Self> {
        config.validate()?;

        let mut stages = Vec::with_capacity(3);
        if config.dictionary.enabled {
            let passwords = PasswordList::collect(
                config.dictionary.include_builtin,
                config.dictionary.wordlist.as_deref(),
            )
            .await?;
            stages.push(Stage::dictionary(passwords));
        }

        let brute_force: [(StageId, &Alphabet, usize, bool); 2] = [
            (
                StageId::Numeric,
                &config.numeric.alphabet,
                config.numeric.max_length,
                config.numeric.enabled,
            ),
            (
                StageId::Alphanumeric,
                &config.alphanumeric.alphabet,
                config.alphanumeric.max_length,
                config.alphanumeric.enabled,
            ),
        ];
        for (id, alphabet, max_length, enabled) in brute_force {
            if enabled {
                stages.push(Stage::brute_force(id, alphabet.clone(), max_length));
            }
        }

        Self::new(stages)
    }

    /// Stages in run order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order until one ends the session
    ///
    /// `cancel` should be un-set when the session starts; once set, the running
    /// stage stops at its next checkpoint. A token that is already cancelled
    /// makes the first stage return `Cancelled` without calling the oracle.
    pub async fn run(
        &self,
        oracle: &dyn PasswordOracle,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> SessionResult {
        let mut ctx = SearchContext::new(oracle, cancel, progress);
        let stage_ids: Vec<StageId> = self.stages.iter().map(Stage::id).collect();

        if cancel.is_cancelled() {
            warn!("cancellation was requested before the search started");
        }

        info!(
            stages = ?stage_ids,
            oracle = ctx.oracle_name(),
            "starting password search"
        );
        ctx.emit(Event::SessionStarted {
            stages: stage_ids,
        });

        let start = Instant::now();

        for stage in &self.stages {
            let id = stage.id();
            let total = stage.total();
            let before = ctx.attempts();

            info!(stage = %id, total, "starting stage");
            ctx.emit(Event::StageStarted { stage: id, total });

            let result = stage.run(&mut ctx).await;
            let attempts = ctx.attempts() - before;

            info!(stage = %id, outcome = ?result.kind(), attempts, "stage finished");
            ctx.emit(Event::StageFinished {
                stage: id,
                outcome: result.kind(),
                attempts,
            });

            if result.ends_session() {
                return finish(&ctx, result, Some(id), start.elapsed());
            }
        }

        finish(&ctx, StageResult::Exhausted, None, start.elapsed())
    }
}

fn finish(
    ctx: &SearchContext<'_>,
    outcome: StageResult,
    stage: Option<StageId>,
    elapsed: Duration,
) -> SessionResult {
    let attempts = ctx.attempts();
    match &outcome {
        StageResult::Found(_) => info!(
            stage = ?stage,
            attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            "password found"
        ),
        StageResult::Exhausted => info!(
            attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            "password not found within the configured search space"
        ),
        StageResult::Cancelled => info!(
            stage = ?stage,
            attempts,
            "password search cancelled"
        ),
        StageResult::OracleError(e) => warn!(
            stage = ?stage,
            attempts,
            error = %e,
            "password search aborted by oracle failure"
        ),
    }

    ctx.emit(Event::SessionFinished {
        outcome: outcome.kind(),
        password: outcome.password().map(str::to_string),
        attempts,
        elapsed_ms: elapsed.as_millis() as u64,
    });

    SessionResult {
        outcome,
        stage,
        attempts,
        elapsed,
    }
}

/// Validate `config`, build its stages and run them against `oracle`
///
/// # Errors
///
/// Returns [`Error::Config`] before anything is searched if the configuration is
/// invalid. Oracle failures during the search are reported in the returned
/// [`SessionResult`], not as `Err`.
pub async fn run_search(
    config: &SearchConfig,
    oracle: &dyn PasswordOracle,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<SessionResult> {
    let session = SearchSession::from_config(config).await?;
    Ok(session.run(oracle, cancel, progress).await)
}
