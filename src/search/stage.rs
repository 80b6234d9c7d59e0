//! Search stages: dictionary lookup and brute force

use super::alphabet::Alphabet;
use super::dictionary::PasswordList;
use super::enumerator::Combinations;
use super::progress::{SearchContext, format_count};
use crate::types::{Event, ProgressEvent, StageId, StageResult};
use tracing::{debug, info, warn};

/// Brute-force candidates tested between two progress/cancellation checkpoints
pub const BATCH_SIZE: usize = 100;

/// One self-contained phase of the search
#[derive(Debug, Clone)]
pub enum Stage {
    /// Try a fixed list of passwords in order
    Dictionary {
        /// Candidates in trial order
        passwords: PasswordList,
    },
    /// Try every string over an alphabet, shortest first
    BruteForce {
        /// Which brute-force stage this is
        id: StageId,
        /// Characters to enumerate
        alphabet: Alphabet,
        /// Longest candidate length, inclusive
        max_length: usize,
    },
}

impl Stage {
    /// Dictionary stage over `passwords`
    pub fn dictionary(passwords: PasswordList) -> Self {
        Stage::Dictionary { passwords }
    }

    /// Brute-force stage over `alphabet`, lengths `1..=max_length`
    pub fn brute_force(id: StageId, alphabet: Alphabet, max_length: usize) -> Self {
        Stage::BruteForce {
            id,
            alphabet,
            max_length,
        }
    }

    /// Identifier of this stage
    pub fn id(&self) -> StageId {
        match self {
            Stage::Dictionary { .. } => StageId::Dictionary,
            Stage::BruteForce { id, .. } => *id,
        }
    }

    /// Candidates this stage tries if nothing matches (saturating)
    pub fn total(&self) -> u64 {
        match self {
            Stage::Dictionary { passwords } => passwords.len() as u64,
            Stage::BruteForce {
                alphabet,
                max_length,
                ..
            } => alphabet.combinations_up_to(*max_length),
        }
    }

    /// Run the stage until it finds the password, exhausts, is cancelled, or the
    /// oracle fails
    ///
    /// The oracle is called exactly once per candidate, one at a time.
    pub async fn run(&self, ctx: &mut SearchContext<'_>) -> StageResult {
        match self {
            Stage::Dictionary { passwords } => run_dictionary(passwords, ctx).await,
            Stage::BruteForce {
                id,
                alphabet,
                max_length,
            } => run_brute_force(*id, alphabet, *max_length, ctx).await,
        }
    }
}

async fn run_dictionary(passwords: &PasswordList, ctx: &mut SearchContext<'_>) -> StageResult {
    let total = passwords.len() as u64;

    for (i, password) in passwords.iter().enumerate() {
        if ctx.is_cancelled() {
            debug!(tested = i, total, "dictionary stage cancelled");
            return StageResult::Cancelled;
        }

        debug!(
            attempt = i + 1,
            total,
            password_length = password.len(),
            "trying dictionary password {}/{}",
            i + 1,
            total
        );

        match ctx.try_candidate(password).await {
            Ok(true) => return StageResult::Found(password.to_string()),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, attempt = i + 1, "oracle failed during dictionary stage");
                return StageResult::OracleError(e);
            }
        }

        ctx.emit(Event::Progress(ProgressEvent::new(
            StageId::Dictionary,
            password,
            i as u64 + 1,
            total,
        )));
        ctx.yield_now().await;
    }

    StageResult::Exhausted
}

async fn run_brute_force(
    id: StageId,
    alphabet: &Alphabet,
    max_length: usize,
    ctx: &mut SearchContext<'_>,
) -> StageResult {
    let mut tested: u64 = 0;
    let mut known: u64 = 0;

    for length in 1..=max_length {
        if ctx.is_cancelled() {
            debug!(stage = %id, length, tested, "brute-force stage cancelled");
            return StageResult::Cancelled;
        }

        let combinations = alphabet.combinations(length);
        known = known.saturating_add(combinations);

        info!(
            stage = %id,
            length,
            combinations,
            "trying {}-character candidates ({} combinations)",
            length,
            format_count(combinations)
        );
        ctx.emit(Event::LengthStarted {
            stage: id,
            length,
            combinations,
        });

        let mut candidates = Combinations::new(alphabet, length);
        let mut tested_at_length: u64 = 0;

        loop {
            let batch: Vec<String> = candidates.by_ref().take(BATCH_SIZE).collect();
            if batch.is_empty() {
                break;
            }

            for candidate in &batch {
                match ctx.try_candidate(candidate).await {
                    Ok(true) => return StageResult::Found(candidate.clone()),
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            stage = %id,
                            length,
                            error = %e,
                            "oracle failed during brute-force stage"
                        );
                        return StageResult::OracleError(e);
                    }
                }
            }

            tested_at_length += batch.len() as u64;
            tested += batch.len() as u64;

            let label = format!(
                "length {}: {}/{}",
                length,
                format_count(tested_at_length),
                format_count(combinations)
            );
            debug!(stage = %id, tested, known, "{}", label);
            ctx.emit(Event::Progress(ProgressEvent::new(id, label, tested, known)));

            ctx.yield_now().await;
            if ctx.is_cancelled() {
                debug!(stage = %id, length, tested, "brute-force stage cancelled");
                return StageResult::Cancelled;
            }
        }
    }

    StageResult::Exhausted
}
