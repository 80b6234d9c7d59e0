use crate::config::{BruteForceConfig, DictionaryConfig, SearchConfig};
use crate::error::{Error, OracleError};
use crate::oracle::PasswordOracle;
use crate::search::*;
use crate::types::{Event, OutcomeKind, StageId, StageResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Oracle that records every candidate it sees
#[derive(Default)]
struct ScriptedOracle {
    /// Candidates that unlock the target
    accepts: Vec<String>,
    /// Fail on this (1-based) call
    fail_on_call: Option<usize>,
    /// Cancel this token on this (1-based) call
    cancel_on_call: Option<(usize, CancellationToken)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    fn accepting(passwords: &[&str]) -> Self {
        Self {
            accepts: passwords.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn rejecting() -> Self {
        Self::default()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PasswordOracle for ScriptedOracle {
    async fn test(&self, candidate: &str) -> Result<bool, OracleError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(candidate.to_string());
            calls.len()
        };

        if let Some((at, token)) = &self.cancel_on_call
            && *at == n
        {
            token.cancel();
        }

        if self.fail_on_call == Some(n) {
            return Err(OracleError::Malformed {
                archive: PathBuf::from("target.zip"),
                reason: format!("failed on call {n}"),
            });
        }

        Ok(self.accepts.iter().any(|p| p == candidate))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn binary() -> Alphabet {
    Alphabet::new("01").unwrap()
}

fn brute_only(id: StageId, alphabet: Alphabet, max_length: usize) -> SearchSession {
    SearchSession::new(vec![Stage::brute_force(id, alphabet, max_length)]).unwrap()
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// Brute force
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_brute_force_finds_after_shorter_lengths() {
    let oracle = ScriptedOracle::accepting(&["10"]);
    let session = brute_only(StageId::Numeric, binary(), 2);

    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    assert_eq!(result.outcome, StageResult::Found("10".into()));
    assert_eq!(result.stage, Some(StageId::Numeric));
    assert_eq!(result.attempts, 5);
    assert_eq!(oracle.calls(), vec!["0", "1", "00", "01", "10"]);
}

#[tokio::test]
async fn test_brute_force_exhaustion_count_is_sum_of_powers() {
    let oracle = ScriptedOracle::rejecting();
    let session = brute_only(StageId::Numeric, Alphabet::numeric(), 3);

    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    assert_eq!(result.outcome, StageResult::Exhausted);
    assert_eq!(result.stage, None);
    assert_eq!(result.attempts, 10 + 100 + 1000);
    assert_eq!(oracle.call_count(), 1110);
}

#[tokio::test]
async fn test_brute_force_max_length_one() {
    let oracle = ScriptedOracle::rejecting();
    let session = brute_only(StageId::Alphanumeric, Alphabet::lower_alphanumeric(), 1);

    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    assert_eq!(result.outcome, StageResult::Exhausted);
    let calls = oracle.calls();
    assert_eq!(calls.len(), 36);
    assert_eq!(calls.first().map(String::as_str), Some("a"));
    assert_eq!(calls.last().map(String::as_str), Some("9"));
}

#[tokio::test]
async fn test_batches_do_not_change_order() {
    // 3 characters, length 5 = 243 candidates, spanning partial batches
    let alphabet = Alphabet::new("abc").unwrap();
    let oracle = ScriptedOracle::rejecting();
    let session = brute_only(StageId::Alphanumeric, alphabet.clone(), 5);

    let _ = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    let expected: Vec<String> = (1..=5)
        .flat_map(|len| Combinations::new(&alphabet, len).collect::<Vec<_>>())
        .collect();
    assert_eq!(oracle.calls(), expected);
}

// ---------------------------------------------------------------------------
// Dictionary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dictionary_returns_first_match_in_list_order() {
    let oracle = ScriptedOracle::accepting(&["0000", "admin"]);
    let session = SearchSession::new(vec![Stage::dictionary(PasswordList::from_passwords([
        "1234", "0000", "admin",
    ]))])
    .unwrap();

    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    assert_eq!(result.password(), Some("0000"));
    assert_eq!(oracle.calls(), vec!["1234", "0000"]);
}

#[tokio::test]
async fn test_dictionary_exhausts_with_one_call_per_entry() {
    let oracle = ScriptedOracle::rejecting();
    let session = SearchSession::new(vec![Stage::dictionary(PasswordList::builtin())]).unwrap();

    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    assert_eq!(result.outcome, StageResult::Exhausted);
    assert_eq!(oracle.call_count(), COMMON_PASSWORDS.len());
}

#[test]
fn test_session_rejects_empty_dictionary() {
    let err = SearchSession::new(vec![Stage::dictionary(PasswordList::default())]).unwrap_err();
    match err {
        Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("dictionary")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_dictionary_without_sources_is_config_error() {
    let oracle = ScriptedOracle::rejecting();
    let config = SearchConfig {
        dictionary: DictionaryConfig {
            enabled: true,
            include_builtin: false,
            wordlist: None,
        },
        ..Default::default()
    };

    let err = run_search(&config, &oracle, &CancellationToken::new(), &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(oracle.call_count(), 0);
}

// ---------------------------------------------------------------------------
// Stage priority
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dictionary_match_skips_brute_force() {
    let oracle = ScriptedOracle::accepting(&["admin", "0", "a"]);
    let session = SearchSession::from_config(&SearchConfig::default())
        .await
        .unwrap();

    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    assert_eq!(result.password(), Some("admin"));
    assert_eq!(result.stage, Some(StageId::Dictionary));
    // "admin" is the sixth built-in password
    assert_eq!(oracle.call_count(), 6);
}

#[tokio::test]
async fn test_stages_run_in_priority_order() {
    // Given out of order; the session reorders them
    let session = SearchSession::new(vec![
        Stage::brute_force(StageId::Alphanumeric, Alphabet::new("a").unwrap(), 1),
        Stage::brute_force(StageId::Numeric, Alphabet::new("0").unwrap(), 1),
        Stage::dictionary(PasswordList::from_passwords(["pw"])),
    ])
    .unwrap();
    let ids: Vec<StageId> = session.stages().iter().map(Stage::id).collect();
    assert_eq!(
        ids,
        vec![StageId::Dictionary, StageId::Numeric, StageId::Alphanumeric]
    );

    let oracle = ScriptedOracle::rejecting();
    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;
    assert_eq!(result.outcome, StageResult::Exhausted);
    assert_eq!(oracle.calls(), vec!["pw", "0", "a"]);
}

#[tokio::test]
async fn test_alphanumeric_retries_digits_after_numeric() {
    let mut config = SearchConfig::default();
    config.dictionary.enabled = false;
    config.numeric.max_length = 1;
    config.alphanumeric.max_length = 1;

    let oracle = ScriptedOracle::rejecting();
    let session = SearchSession::from_config(&config).await.unwrap();
    let result = session
        .run(&oracle, &CancellationToken::new(), &NoProgress)
        .await;

    assert_eq!(result.outcome, StageResult::Exhausted);
    assert_eq!(result.attempts, 10 + 36);
    let zeros = oracle.calls().iter().filter(|c| c.as_str() == "0").count();
    assert_eq!(zeros, 2);
}

#[tokio::test]
async fn test_disabled_stages_are_skipped() {
    let config = SearchConfig {
        dictionary: DictionaryConfig {
            enabled: false,
            ..Default::default()
        },
        numeric: BruteForceConfig::numeric().disabled(),
        alphanumeric: BruteForceConfig {
            enabled: true,
            alphabet: Alphabet::new("xy").unwrap(),
            max_length: 1,
        },
    };

    let session = SearchSession::from_config(&config).await.unwrap();
    assert_eq!(session.stages().len(), 1);
    assert_eq!(session.stages()[0].id(), StageId::Alphanumeric);
    assert_eq!(session.stages()[0].total(), 2);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cancellation_stops_within_one_batch() {
    let token = CancellationToken::new();
    let oracle = ScriptedOracle {
        cancel_on_call: Some((150, token.clone())),
        ..Default::default()
    };
    let session = brute_only(StageId::Alphanumeric, Alphabet::lower_alphanumeric(), 3);

    let result = session.run(&oracle, &token, &NoProgress).await;

    assert_eq!(result.outcome, StageResult::Cancelled);
    assert_eq!(result.stage, Some(StageId::Alphanumeric));
    let calls = oracle.call_count();
    assert!(calls >= 150);
    assert!(calls < 150 + BATCH_SIZE, "made {calls} calls after cancelling");
    assert!((calls as u64) < Alphabet::lower_alphanumeric().combinations_up_to(3));
}

#[tokio::test]
async fn test_cancellation_in_dictionary_stops_after_current_candidate() {
    let token = CancellationToken::new();
    let oracle = ScriptedOracle {
        cancel_on_call: Some((3, token.clone())),
        ..Default::default()
    };
    let session = SearchSession::from_config(&SearchConfig::default())
        .await
        .unwrap();

    let result = session.run(&oracle, &token, &NoProgress).await;

    assert_eq!(result.outcome, StageResult::Cancelled);
    assert_eq!(result.stage, Some(StageId::Dictionary));
    assert_eq!(oracle.call_count(), 3);
}

#[tokio::test]
async fn test_pre_cancelled_token_makes_no_calls() {
    let token = CancellationToken::new();
    token.cancel();
    let oracle = ScriptedOracle::accepting(&["0"]);
    let session = brute_only(StageId::Numeric, Alphabet::numeric(), 2);

    let result = session.run(&oracle, &token, &NoProgress).await;

    assert_eq!(result.outcome, StageResult::Cancelled);
    assert_eq!(oracle.call_count(), 0);
}

// ---------------------------------------------------------------------------
// Oracle errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_oracle_error_aborts_session() {
    let oracle = ScriptedOracle {
        fail_on_call: Some(4),
        ..Default::default()
    };
    let mut config = SearchConfig::default();
    config.dictionary.enabled = false;

    let result = run_search(
        &config,
        &oracle,
        &CancellationToken::new(),
        &NoProgress,
    )
    .await
    .unwrap();

    assert!(matches!(result.outcome, StageResult::OracleError(_)));
    assert_eq!(result.stage, Some(StageId::Numeric));
    assert_eq!(oracle.calls(), vec!["0", "1", "2", "3"]);
    assert!(matches!(result.into_result(), Err(Error::Oracle(_))));
}

#[tokio::test]
async fn test_oracle_error_in_dictionary_skips_later_stages() {
    let oracle = ScriptedOracle {
        fail_on_call: Some(1),
        ..Default::default()
    };
    let result = run_search(
        &SearchConfig::default(),
        &oracle,
        &CancellationToken::new(),
        &NoProgress,
    )
    .await
    .unwrap();

    assert_eq!(result.stage, Some(StageId::Dictionary));
    assert_eq!(result.attempts, 1);
    assert_eq!(result.exit_code(), 3);
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_config_error_before_any_call() {
    let oracle = ScriptedOracle::rejecting();
    let mut config = SearchConfig::default();
    config.numeric.max_length = 0;

    let err = run_search(&config, &oracle, &CancellationToken::new(), &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(oracle.call_count(), 0);
}

#[test]
fn test_session_rejects_no_stages() {
    assert!(matches!(
        SearchSession::new(Vec::new()),
        Err(Error::Config { .. })
    ));
}

#[test]
fn test_session_rejects_zero_length_brute_force() {
    let err = SearchSession::new(vec![Stage::brute_force(
        StageId::Numeric,
        Alphabet::numeric(),
        0,
    )])
    .unwrap_err();
    match err {
        Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("numeric.max_length")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_session_rejects_brute_force_with_dictionary_id() {
    let err = SearchSession::new(vec![Stage::brute_force(
        StageId::Dictionary,
        Alphabet::numeric(),
        2,
    )])
    .unwrap_err();
    assert!(matches!(err, Error::Config { key: None, .. }));
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_events_for_brute_force_session() {
    let (tx, mut rx) = broadcast::channel::<Event>(1024);
    let oracle = ScriptedOracle::rejecting();
    let session = brute_only(StageId::Numeric, Alphabet::numeric(), 3);

    let result = session.run(&oracle, &CancellationToken::new(), &tx).await;
    assert_eq!(result.outcome, StageResult::Exhausted);

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(Event::SessionStarted { .. })));
    assert!(matches!(
        events.last(),
        Some(Event::SessionFinished {
            outcome: OutcomeKind::Exhausted,
            password: None,
            attempts: 1110,
            ..
        })
    ));

    let lengths: Vec<(usize, u64)> = events
        .iter()
        .filter_map(|e| match e {
            Event::LengthStarted {
                length,
                combinations,
                ..
            } => Some((*length, *combinations)),
            _ => None,
        })
        .collect();
    assert_eq!(lengths, vec![(1, 10), (2, 100), (3, 1000)]);

    let progress: Vec<(u64, u64)> = events
        .iter()
        .filter_map(|e| match e {
            Event::Progress(p) => Some((p.tested, p.total)),
            _ => None,
        })
        .collect();
    // length 1: one partial batch; length 2: one full batch; length 3: ten batches
    assert_eq!(progress.len(), 1 + 1 + 10);
    assert_eq!(progress[0], (10, 10));
    assert_eq!(progress[1], (110, 110));
    assert_eq!(progress[2], (210, 1110));
    assert_eq!(progress.last(), Some(&(1110, 1110)));
}

#[tokio::test]
async fn test_dictionary_progress_labels_candidate() {
    let (tx, mut rx) = broadcast::channel::<Event>(64);
    let oracle = ScriptedOracle::accepting(&["c"]);
    let session = SearchSession::new(vec![Stage::dictionary(PasswordList::from_passwords([
        "a", "b", "c",
    ]))])
    .unwrap();

    let _ = session.run(&oracle, &CancellationToken::new(), &tx).await;

    let progress: Vec<(String, u64, u64)> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::Progress(p) => Some((p.label, p.tested, p.total)),
            _ => None,
        })
        .collect();
    assert_eq!(
        progress,
        vec![("a".to_string(), 1, 3), ("b".to_string(), 2, 3)]
    );
}

#[tokio::test]
async fn test_stage_finished_reports_per_stage_attempts() {
    let (tx, mut rx) = broadcast::channel::<Event>(1024);
    let oracle = ScriptedOracle::accepting(&["b"]);
    let session = SearchSession::new(vec![
        Stage::dictionary(PasswordList::from_passwords(["x", "y"])),
        Stage::brute_force(StageId::Alphanumeric, Alphabet::new("ab").unwrap(), 1),
    ])
    .unwrap();

    let result = session.run(&oracle, &CancellationToken::new(), &tx).await;
    assert_eq!(result.attempts, 4);

    let finished: Vec<(StageId, OutcomeKind, u64)> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::StageFinished {
                stage,
                outcome,
                attempts,
            } => Some((stage, outcome, attempts)),
            _ => None,
        })
        .collect();
    assert_eq!(
        finished,
        vec![
            (StageId::Dictionary, OutcomeKind::Exhausted, 2),
            (StageId::Alphanumeric, OutcomeKind::Found, 2),
        ]
    );
}
