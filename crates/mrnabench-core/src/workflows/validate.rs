use crate::core::models::codon::{Codon, ModelError};
use crate::core::models::protein::ProteinSequence;
use crate::core::models::result::FoldResult;
use crate::core::reference::{ReferenceError, ReferenceModel};
use crate::core::tables::codon_usage::CodonLookup;
use crate::engine::config::BenchConfig;
use crate::engine::engines::{self, Engine, EngineKind};
use crate::engine::error::EngineError;
use crate::engine::process::ProcessRunner;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::retry::{self, InputSequence, RetryError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Number of offending codons quoted in a membership failure.
const MAX_QUOTED_CODONS: usize = 5;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Cannot generate input sequence: {0}")]
    Input(#[from] ModelError),

    #[error("Reference model failed on {engine} output for '{sequence}': {source}")]
    Reference {
        engine: EngineKind,
        sequence: String,
        #[source]
        source: ReferenceError,
    },

    #[error("Invalid validation request: {0}")]
    InvalidRequest(String),
}

impl ValidationError {
    /// Whether the harness itself is broken, so every further sequence would fail the
    /// same way. Engine failures and reference failures stay local to one sequence.
    pub fn is_harness_failure(&self) -> bool {
        match self {
            Self::Engine(e) => !e.is_engine_failure(),
            Self::Reference { .. } => false,
            Self::Input(_) | Self::InvalidRequest(_) => true,
        }
    }
}

impl From<RetryError> for ValidationError {
    fn from(error: RetryError) -> Self {
        match error {
            RetryError::Engine(e) => Self::Engine(e),
            RetryError::Input(e) => Self::Input(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    /// RNA length against three times the protein length.
    Length,
    /// Each codon against the synonyms of its residue.
    CodonMembership,
    /// Reported CAI against CAI recomputed from the codons.
    Cai,
    /// Reported MFE against the reference energy of the reported structure.
    ReferenceEnergy,
    /// Reported MFE against the reference energy of the reference's own optimal structure.
    ReferenceOptimum,
    /// MFE of one engine against another.
    PairwiseMfe,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Length => "length",
            Metric::CodonMembership => "codon membership",
            Metric::Cai => "CAI",
            Metric::ReferenceEnergy => "reference energy",
            Metric::ReferenceOptimum => "reference optimum",
            Metric::PairwiseMfe => "pairwise MFE",
        })
    }
}

/// One disagreement found by the harness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub metric: Metric,
    pub engines: Vec<EngineKind>,
    pub sequence: String,
    /// The values that disagreed, in the order the detail text names them.
    pub observed: Vec<f64>,
    pub detail: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engines: Vec<&str> = self.engines.iter().map(|e| e.name()).collect();
        write!(
            f,
            "[{}] {} on '{}': {}",
            self.metric,
            engines.join(" vs "),
            self.sequence,
            self.detail
        )
    }
}

#[derive(Debug, Clone)]
pub struct EngineRun {
    pub engine: EngineKind,
    pub result: FoldResult,
    pub attempts: u32,
}

/// Everything the harness produced for one protein sequence.
#[derive(Debug)]
pub struct SequenceCheck {
    pub sequence: ProteinSequence,
    pub runs: Vec<EngineRun>,
    pub failures: Vec<ValidationFailure>,
    /// Engine or reference errors hit on this sequence. An engine error ends the
    /// invocations for the sequence; the runs gathered before it are still checked.
    pub errors: Vec<ValidationError>,
}

/// Disagreements and reference errors found by [`check_runs`].
#[derive(Debug, Default)]
pub struct RunChecks {
    pub failures: Vec<ValidationFailure>,
    pub errors: Vec<ValidationError>,
}

/// An error that ended the checks of one sequence in a batch.
#[derive(Debug)]
pub struct SequenceError {
    /// `None` when the error struck before a random sequence was settled on.
    pub sequence: Option<String>,
    pub error: ValidationError,
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sequence {
            Some(sequence) => write!(f, "'{sequence}': {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub sequences_checked: usize,
    pub invocations: usize,
    pub failures: Vec<ValidationFailure>,
    pub errors: Vec<SequenceError>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum BatchInput {
    /// A single user-supplied sequence, checked once.
    Fixed(ProteinSequence),
    Random { length: usize, iterations: usize },
}

#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub engines: Vec<EngineKind>,
    pub input: BatchInput,
    pub seed: u64,
}

/// Runs a set of engines on the same sequence and checks their results.
///
/// The flaky engine, when selected, runs first through the retry policy; the sequence it
/// finally succeeded on is the one every other engine is given.
pub struct CrossValidator<'a> {
    table: &'a dyn CodonLookup,
    reference: &'a dyn ReferenceModel,
    runner: ProcessRunner,
    epsilon: f64,
    engines: Vec<Box<dyn Engine>>,
}

impl<'a> CrossValidator<'a> {
    pub fn new(
        config: &BenchConfig,
        table: &'a dyn CodonLookup,
        reference: &'a dyn ReferenceModel,
        kinds: &[EngineKind],
    ) -> Self {
        let mut ordered: Vec<EngineKind> = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if !ordered.contains(&kind) {
                ordered.push(kind);
            }
        }
        ordered.sort_by_key(|kind| !kind.is_flaky());
        Self {
            table,
            reference,
            runner: ProcessRunner::new(config.sample_interval),
            epsilon: config.epsilon,
            engines: ordered
                .into_iter()
                .map(|kind| engines::engine_for(kind, config))
                .collect(),
        }
    }

    pub fn engines(&self) -> Vec<EngineKind> {
        self.engines.iter().map(|engine| engine.kind()).collect()
    }

    fn invoke(
        &self,
        engine: &dyn Engine,
        sequence: &ProteinSequence,
        reporter: &ProgressReporter,
    ) -> Result<FoldResult, EngineError> {
        reporter.report(Progress::EngineStart {
            engine: engine.kind(),
            length: sequence.len(),
        });
        engines::invoke(engine, &self.runner, sequence, self.table)
    }

    /// Runs every engine on one sequence and checks the results.
    ///
    /// # Errors
    ///
    /// Fails only when no sequence could be settled on, that is when the flaky engine
    /// fails on a fixed input or the harness around it breaks. Later errors are kept in
    /// [`SequenceCheck::errors`].
    pub fn validate_sequence(
        &self,
        input: InputSequence<'_>,
        reporter: &ProgressReporter,
    ) -> Result<SequenceCheck, ValidationError> {
        let mut remaining = self.engines.iter();
        let (sequence, mut runs) = match self.engines.first() {
            Some(flaky) if flaky.kind().is_flaky() => {
                remaining.next();
                let outcome = retry::run_with_retry(flaky.kind(), input, reporter, |s| {
                    self.invoke(flaky.as_ref(), s, reporter)
                })?;
                let run = EngineRun {
                    engine: flaky.kind(),
                    result: outcome.result,
                    attempts: outcome.attempts,
                };
                (outcome.sequence, vec![run])
            }
            _ => {
                let sequence = match input {
                    InputSequence::Fixed(sequence) => sequence,
                    InputSequence::Random { length, rng } => ProteinSequence::random(length, rng)?,
                };
                (sequence, Vec::with_capacity(self.engines.len()))
            }
        };

        let mut errors = Vec::new();
        for engine in remaining {
            match self.invoke(engine.as_ref(), &sequence, reporter) {
                Ok(result) => runs.push(EngineRun {
                    engine: engine.kind(),
                    result,
                    attempts: 1,
                }),
                Err(e) => {
                    errors.push(ValidationError::Engine(e));
                    break;
                }
            }
        }

        let checks = check_runs(&sequence, &runs, self.table, self.reference, self.epsilon);
        errors.extend(checks.errors);
        Ok(SequenceCheck {
            sequence,
            runs,
            failures: checks.failures,
            errors,
        })
    }
}

fn agrees(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn failure(
    metric: Metric,
    engines: Vec<EngineKind>,
    sequence: &str,
    observed: Vec<f64>,
    detail: String,
) -> ValidationFailure {
    ValidationFailure {
        metric,
        engines,
        sequence: sequence.to_string(),
        observed,
        detail,
    }
}

/// Checks every run against the protein, the codon table, the reference model and each
/// other. All checks run; every disagreement is returned.
///
/// A reference model error skips the remaining reference checks of that run only and is
/// returned next to the disagreements.
pub fn check_runs(
    protein: &ProteinSequence,
    runs: &[EngineRun],
    table: &dyn CodonLookup,
    reference: &dyn ReferenceModel,
    epsilon: f64,
) -> RunChecks {
    let sequence = protein.to_string();
    let mut failures = Vec::new();
    let mut errors = Vec::new();

    for run in runs {
        let engine = run.engine;
        let result = &run.result;
        let rna = result.rna_sequence();
        let expected = protein.coding_length();

        if rna.len() != expected {
            failures.push(failure(
                Metric::Length,
                vec![engine],
                &sequence,
                vec![rna.len() as f64, expected as f64],
                format!(
                    "RNA has {} nucleotides, expected {expected} for {} residues",
                    rna.len(),
                    protein.len()
                ),
            ));
        } else {
            match result.codons() {
                Ok(codons) => check_codons(
                    protein,
                    &codons,
                    result,
                    engine,
                    table,
                    epsilon,
                    &sequence,
                    &mut failures,
                ),
                Err(e) => failures.push(failure(
                    Metric::Length,
                    vec![engine],
                    &sequence,
                    Vec::new(),
                    e.to_string(),
                )),
            }
        }

        if let Err(source) = check_reference(run, reference, epsilon, &sequence, &mut failures) {
            errors.push(ValidationError::Reference {
                engine,
                sequence: sequence.clone(),
                source,
            });
        }
    }

    for (i, first) in runs.iter().enumerate() {
        for second in &runs[i + 1..] {
            let (a, b) = (first.result.mfe(), second.result.mfe());
            if !agrees(a, b, epsilon) {
                failures.push(failure(
                    Metric::PairwiseMfe,
                    vec![first.engine, second.engine],
                    &sequence,
                    vec![a, b],
                    format!("MFE {a} vs {b}"),
                ));
            }
        }
    }

    RunChecks { failures, errors }
}

fn check_reference(
    run: &EngineRun,
    reference: &dyn ReferenceModel,
    epsilon: f64,
    sequence: &str,
    failures: &mut Vec<ValidationFailure>,
) -> Result<(), ReferenceError> {
    let result = &run.result;
    let rna = result.rna_sequence();

    let energy = reference.free_energy(rna, result.structure())?;
    if !agrees(energy, result.mfe(), epsilon) {
        failures.push(failure(
            Metric::ReferenceEnergy,
            vec![run.engine],
            sequence,
            vec![result.mfe(), energy],
            format!(
                "reported MFE {} but the reference scores the reported structure at {energy}",
                result.mfe()
            ),
        ));
    }

    let predicted = reference.predict_mfe_structure(rna)?;
    let optimum = reference.free_energy(rna, &predicted)?;
    if !agrees(optimum, result.mfe(), epsilon) {
        failures.push(failure(
            Metric::ReferenceOptimum,
            vec![run.engine],
            sequence,
            vec![result.mfe(), optimum],
            format!(
                "reported MFE {} but the reference optimum is {optimum}",
                result.mfe()
            ),
        ));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn check_codons(
    protein: &ProteinSequence,
    codons: &[Codon],
    result: &FoldResult,
    engine: EngineKind,
    table: &dyn CodonLookup,
    epsilon: f64,
    sequence: &str,
    failures: &mut Vec<ValidationFailure>,
) {
    let misplaced: Vec<String> = codons
        .iter()
        .zip(protein.residues())
        .enumerate()
        .filter(|(_, (codon, amino_acid))| !table.codons_for(**amino_acid).contains(codon))
        .map(|(position, (codon, amino_acid))| format!("{codon} at {position} for {amino_acid}"))
        .collect();
    if !misplaced.is_empty() {
        let quoted = &misplaced[..misplaced.len().min(MAX_QUOTED_CODONS)];
        failures.push(failure(
            Metric::CodonMembership,
            vec![engine],
            sequence,
            Vec::new(),
            format!(
                "{} codon(s) are not synonyms of their residue: {}",
                misplaced.len(),
                quoted.join(", ")
            ),
        ));
    }

    let Some(reported) = result.cai() else {
        return;
    };
    match table.codon_adaptation_index(codons) {
        Ok(recomputed) if agrees(reported, recomputed, epsilon) => {}
        Ok(recomputed) => failures.push(failure(
            Metric::Cai,
            vec![engine],
            sequence,
            vec![reported, recomputed],
            format!("reported CAI {reported} but the codons give {recomputed}"),
        )),
        Err(e) => failures.push(failure(
            Metric::Cai,
            vec![engine],
            sequence,
            vec![reported],
            format!("cannot recompute CAI: {e}"),
        )),
    }
}

/// Cross-validates the requested engines over a batch of sequences.
///
/// Disagreements and per-sequence errors are collected into the report. An engine or
/// reference error ends only the sequence it struck; a harness failure, such as a missing
/// executable, stops the batch early with the report gathered so far.
#[instrument(skip_all, name = "validation_workflow", fields(engines = ?request.engines))]
pub fn run(
    config: &BenchConfig,
    table: &dyn CodonLookup,
    reference: &dyn ReferenceModel,
    request: &ValidationRequest,
    reporter: &ProgressReporter,
) -> Result<ValidationReport, ValidationError> {
    if request.engines.is_empty() {
        return Err(ValidationError::InvalidRequest(
            "at least one engine must be selected".to_string(),
        ));
    }
    let iterations = match &request.input {
        BatchInput::Fixed(_) => 1,
        BatchInput::Random { length, iterations } => {
            if *length < 2 {
                return Err(ValidationError::InvalidRequest(format!(
                    "random sequences need at least 2 residues, got {length}"
                )));
            }
            *iterations
        }
    };

    let validator = CrossValidator::new(config, table, reference, &request.engines);
    let mut rng = StdRng::seed_from_u64(request.seed);
    let mut report = ValidationReport::default();
    info!(
        engines = ?validator.engines(),
        iterations,
        epsilon = config.epsilon,
        "Starting cross-validation."
    );

    reporter.report(Progress::PhaseStart {
        name: "Cross-validation",
    });
    reporter.report(Progress::TaskStart {
        total_steps: iterations as u64,
    });
    for _ in 0..iterations {
        let input = match &request.input {
            BatchInput::Fixed(sequence) => InputSequence::Fixed(sequence.clone()),
            BatchInput::Random { length, .. } => InputSequence::Random {
                length: *length,
                rng: &mut rng,
            },
        };
        let (sequence, errors) = match validator.validate_sequence(input, reporter) {
            Ok(check) => {
                for failure in &check.failures {
                    warn!(%failure, "Validation failure.");
                }
                report.sequences_checked += 1;
                report.invocations +=
                    check.runs.iter().map(|run| run.attempts as usize).sum::<usize>();
                report.failures.extend(check.failures);
                (Some(check.sequence.to_string()), check.errors)
            }
            Err(error) => {
                let sequence = match &request.input {
                    BatchInput::Fixed(sequence) => Some(sequence.to_string()),
                    BatchInput::Random { .. } => None,
                };
                (sequence, vec![error])
            }
        };

        let harness_failed = errors.iter().any(ValidationError::is_harness_failure);
        for error in errors {
            warn!(%error, "Sequence could not be fully checked.");
            report.errors.push(SequenceError {
                sequence: sequence.clone(),
                error,
            });
        }
        reporter.report(Progress::TaskIncrement);
        if harness_failed {
            warn!("Stopping cross-validation: the harness cannot run the engines.");
            break;
        }
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(
        sequences = report.sequences_checked,
        failures = report.failures.len(),
        errors = report.errors.len(),
        "Cross-validation finished."
    );
    Ok(report)
}
