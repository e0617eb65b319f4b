use super::engines::EngineKind;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::codon::ModelError;
use crate::core::models::protein::ProteinSequence;
use crate::core::models::result::FoldResult;
use rand::RngCore;
use thiserror::Error;
use tracing::{info, warn};

/// Where the sequence for each attempt comes from.
pub enum InputSequence<'r> {
    /// Supplied by the caller; a failure on it is final.
    Fixed(ProteinSequence),
    /// Drawn from `rng`; a fresh sequence of the same length is drawn after each failure.
    Random {
        length: usize,
        rng: &'r mut dyn RngCore,
    },
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Cannot generate input sequence: {0}")]
    Input(#[from] ModelError),
}

#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub result: FoldResult,
    /// The sequence the successful attempt ran on.
    pub sequence: ProteinSequence,
    pub attempts: u32,
}

enum State {
    Attempt {
        sequence: ProteinSequence,
        attempt: u32,
    },
    Done(RetryOutcome),
}

/// Runs `invoke` until it succeeds, regenerating random input after each engine failure.
///
/// A fixed input is attempted exactly once. Random input is retried without bound, but
/// only when the engine itself failed; harness failures such as a missing executable are
/// returned immediately.
pub fn run_with_retry<F>(
    engine: EngineKind,
    input: InputSequence<'_>,
    reporter: &ProgressReporter,
    mut invoke: F,
) -> Result<RetryOutcome, RetryError>
where
    F: FnMut(&ProteinSequence) -> Result<FoldResult, EngineError>,
{
    let (sequence, mut rng) = match input {
        InputSequence::Fixed(sequence) => (sequence, None),
        InputSequence::Random { length, rng } => (ProteinSequence::random(length, rng)?, Some(rng)),
    };

    let mut state = State::Attempt {
        sequence,
        attempt: 1,
    };
    loop {
        state = match state {
            State::Attempt { sequence, attempt } => match invoke(&sequence) {
                Ok(result) => State::Done(RetryOutcome {
                    result,
                    sequence,
                    attempts: attempt,
                }),
                Err(error) => match rng.as_mut() {
                    Some(rng) if error.is_engine_failure() => {
                        warn!(%engine, attempt, %error, "Engine failed; retrying with a new random sequence.");
                        reporter.report(Progress::EngineRetry { engine, attempt });
                        State::Attempt {
                            sequence: ProteinSequence::random(sequence.len(), &mut **rng)?,
                            attempt: attempt + 1,
                        }
                    }
                    _ => return Err(error.into()),
                },
            },
            State::Done(outcome) => {
                if outcome.attempts > 1 {
                    info!(%engine, attempts = outcome.attempts, "Engine succeeded after retrying.");
                }
                return Ok(outcome);
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::result::ResourceUsage;
    use crate::engine::error::ParseError;
    use crate::engine::process::ProcessError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use std::io;
    use std::sync::Mutex;

    fn design(sequence: &ProteinSequence) -> FoldResult {
        let length = sequence.coding_length();
        FoldResult::new(
            "A".repeat(length),
            ".".repeat(length),
            0.0,
            Some(1.0),
            ResourceUsage {
                elapsed_seconds: 0.1,
                peak_memory_bytes: None,
            },
        )
        .unwrap()
    }

    fn crash(sequence: &ProteinSequence) -> EngineError {
        EngineError::Invocation {
            engine: EngineKind::LinearDesign,
            sequence: sequence.to_string(),
            exit_code: Some(134),
            stderr: "Assertion failed".to_string(),
        }
    }

    #[test]
    fn fixed_input_succeeds_on_first_attempt() {
        let sequence: ProteinSequence = "MLLLLV".parse().unwrap();
        let outcome = run_with_retry(
            EngineKind::LinearDesign,
            InputSequence::Fixed(sequence.clone()),
            &ProgressReporter::new(),
            |s| Ok(design(s)),
        )
        .unwrap();
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.sequence, sequence);
        assert_eq!(outcome.result.rna_sequence().len(), 18);
    }

    #[test]
    fn fixed_input_failure_is_fatal_after_one_attempt() {
        let calls = Cell::new(0);
        let result = run_with_retry(
            EngineKind::LinearDesign,
            InputSequence::Fixed("MLLLLV".parse().unwrap()),
            &ProgressReporter::new(),
            |s| {
                calls.set(calls.get() + 1);
                Err(crash(s))
            },
        );
        assert_eq!(calls.get(), 1);
        assert!(matches!(
            result,
            Err(RetryError::Engine(EngineError::Invocation { .. }))
        ));
    }

    #[test]
    fn random_input_is_regenerated_until_success() {
        let mut rng = StdRng::seed_from_u64(7);
        let seen = Mutex::new(Vec::new());
        let retries = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::EngineRetry { attempt, .. } = event {
                retries.lock().unwrap().push(attempt);
            }
        }));
        let outcome = run_with_retry(
            EngineKind::LinearDesign,
            InputSequence::Random {
                length: 30,
                rng: &mut rng,
            },
            &reporter,
            |s| {
                let mut seen = seen.lock().unwrap();
                seen.push(s.clone());
                if seen.len() < 5 { Err(crash(s)) } else { Ok(design(s)) }
            },
        )
        .unwrap();
        drop(reporter);

        let seen = seen.into_inner().unwrap();
        assert_eq!(outcome.attempts, 5);
        assert_eq!(seen.len(), 5);
        assert_eq!(&outcome.sequence, seen.last().unwrap());
        assert!(seen.iter().all(|s| s.len() == 30));
        assert_ne!(seen[0], seen[1]);
        assert_eq!(retries.into_inner().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn parse_failures_are_retried_for_random_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let calls = Cell::new(0);
        let outcome = run_with_retry(
            EngineKind::LinearDesign,
            InputSequence::Random {
                length: 10,
                rng: &mut rng,
            },
            &ProgressReporter::new(),
            |s| {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Err(EngineError::Parse {
                        engine: EngineKind::LinearDesign,
                        sequence: s.to_string(),
                        source: ParseError::MissingMarker("mRNA sequence:"),
                    })
                } else {
                    Ok(design(s))
                }
            },
        )
        .unwrap();
        assert_eq!(outcome.attempts, 2);
    }

    #[test]
    fn harness_failures_are_not_retried() {
        let mut rng = StdRng::seed_from_u64(3);
        let calls = Cell::new(0);
        let result = run_with_retry(
            EngineKind::LinearDesign,
            InputSequence::Random {
                length: 10,
                rng: &mut rng,
            },
            &ProgressReporter::new(),
            |_| {
                calls.set(calls.get() + 1);
                Err(EngineError::Spawn {
                    engine: EngineKind::LinearDesign,
                    source: ProcessError::Spawn {
                        program: "bin/LinearDesign_2D".to_string(),
                        source: io::Error::from(io::ErrorKind::NotFound),
                    },
                })
            },
        );
        assert_eq!(calls.get(), 1);
        assert!(matches!(
            result,
            Err(RetryError::Engine(EngineError::Spawn { .. }))
        ));
    }

    #[test]
    fn too_short_random_length_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = run_with_retry(
            EngineKind::LinearDesign,
            InputSequence::Random {
                length: 1,
                rng: &mut rng,
            },
            &ProgressReporter::new(),
            |s| Ok(design(s)),
        );
        assert!(matches!(result, Err(RetryError::Input(_))));
    }
}
