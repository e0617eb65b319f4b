use crate::core::models::codon::ModelError;
use crate::core::models::protein::ProteinSequence;
use crate::core::models::result::FoldResult;
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
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub const DEFAULT_MIN_LENGTH: usize = 50;
pub const DEFAULT_MAX_LENGTH: usize = 1500;
pub const DEFAULT_STEP: usize = 50;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Engines whose cost grows fast enough that the sweep stops calling them once a run
/// exceeds the timeout budget.
const BUDGETED_ENGINES: [EngineKind; 2] = [EngineKind::CdsFold, EngineKind::Derna];

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Cannot generate input sequence: {0}")]
    Input(#[from] ModelError),

    #[error("Invalid sweep plan: {0}")]
    InvalidPlan(String),
}

impl From<RetryError> for BenchmarkError {
    fn from(error: RetryError) -> Self {
        match error {
            RetryError::Engine(e) => Self::Engine(e),
            RetryError::Input(e) => Self::Input(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceMode {
    /// `M`, random residues, then a stop.
    #[default]
    Random,
    /// `M` followed by leucines.
    MethionineLeucine,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown sequence mode '{0}' (expected 'random' or 'mll')")]
pub struct UnknownMode(pub String);

impl FromStr for SequenceMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(SequenceMode::Random),
            "mll" => Ok(SequenceMode::MethionineLeucine),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for SequenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SequenceMode::Random => "random",
            SequenceMode::MethionineLeucine => "mll",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    pub min_length: usize,
    pub max_length: usize,
    pub step: usize,
    pub mode: SequenceMode,
    /// Advisory budget. An engine whose slowest run so far exceeded it is skipped for
    /// the remaining lengths; a running engine is never interrupted.
    pub timeout: Duration,
    pub seed: u64,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            step: DEFAULT_STEP,
            mode: SequenceMode::default(),
            timeout: DEFAULT_TIMEOUT,
            seed: 0,
        }
    }
}

impl SweepPlan {
    pub fn lengths(&self) -> impl Iterator<Item = usize> {
        (self.min_length..=self.max_length).step_by(self.step.max(1))
    }

    fn validate(&self) -> Result<(), BenchmarkError> {
        let shortest = match self.mode {
            SequenceMode::Random => 2,
            SequenceMode::MethionineLeucine => 1,
        };
        if self.step == 0 {
            return Err(BenchmarkError::InvalidPlan("step must be positive".into()));
        }
        if self.min_length < shortest {
            return Err(BenchmarkError::InvalidPlan(format!(
                "{} mode needs lengths of at least {shortest}, got {}",
                self.mode, self.min_length
            )));
        }
        if self.min_length > self.max_length {
            return Err(BenchmarkError::InvalidPlan(format!(
                "min length {} exceeds max length {}",
                self.min_length, self.max_length
            )));
        }
        Ok(())
    }
}

/// One measured engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    pub length: usize,
    pub engine: EngineKind,
    pub sequence: String,
    pub elapsed_seconds: f64,
    pub peak_memory_bytes: Option<u64>,
    pub attempts: u32,
}

impl BenchmarkRecord {
    fn new(
        length: usize,
        engine: EngineKind,
        sequence: &ProteinSequence,
        result: &FoldResult,
        attempts: u32,
    ) -> Self {
        Self {
            length,
            engine,
            sequence: sequence.to_string(),
            elapsed_seconds: result.elapsed_seconds(),
            peak_memory_bytes: result.peak_memory_bytes(),
            attempts,
        }
    }
}

struct Sweep<'a, 'r, F> {
    table: &'a dyn CodonLookup,
    reporter: &'a ProgressReporter<'r>,
    runner: ProcessRunner,
    on_record: F,
    records: Vec<BenchmarkRecord>,
}

impl<F: FnMut(&BenchmarkRecord)> Sweep<'_, '_, F> {
    fn invoke(
        &self,
        engine: &dyn Engine,
        sequence: &ProteinSequence,
    ) -> Result<FoldResult, EngineError> {
        self.reporter.report(Progress::EngineStart {
            engine: engine.kind(),
            length: sequence.len(),
        });
        engines::invoke(engine, &self.runner, sequence, self.table)
    }

    fn record(&mut self, record: BenchmarkRecord) {
        info!(
            length = record.length,
            engine = %record.engine,
            elapsed_seconds = record.elapsed_seconds,
            peak_memory_bytes = ?record.peak_memory_bytes,
            attempts = record.attempts,
            "Measured engine run."
        );
        (self.on_record)(&record);
        self.records.push(record);
    }
}

/// Sweeps protein lengths and measures every engine's time and peak memory.
///
/// Per length, LinearDesign runs first through the retry policy and the sequence it
/// finally succeeded on is given to every other engine. `on_record` sees each record as
/// soon as it is measured.
#[instrument(skip_all, name = "benchmark_workflow", fields(mode = %plan.mode))]
pub fn run<F>(
    config: &BenchConfig,
    table: &dyn CodonLookup,
    plan: &SweepPlan,
    reporter: &ProgressReporter,
    on_record: F,
) -> Result<Vec<BenchmarkRecord>, BenchmarkError>
where
    F: FnMut(&BenchmarkRecord),
{
    plan.validate()?;

    let lineardesign = engines::engine_for(EngineKind::LinearDesign, config);
    let mrnafold = engines::engine_for(EngineKind::MrnaFold, config);
    let budgeted: Vec<Box<dyn Engine>> = BUDGETED_ENGINES
        .iter()
        .map(|&kind| engines::engine_for(kind, config))
        .collect();
    let mut slowest: BTreeMap<EngineKind, f64> =
        BUDGETED_ENGINES.iter().map(|&kind| (kind, 0.0)).collect();
    let budget = plan.timeout.as_secs_f64();

    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut sweep = Sweep {
        table,
        reporter,
        runner: ProcessRunner::new(config.sample_interval),
        on_record,
        records: Vec::new(),
    };
    let lengths: Vec<usize> = plan.lengths().collect();
    info!(
        lengths = lengths.len(),
        min = plan.min_length,
        max = plan.max_length,
        timeout_seconds = budget,
        seed = plan.seed,
        "Starting benchmark sweep."
    );

    reporter.report(Progress::PhaseStart { name: "Benchmark" });
    reporter.report(Progress::TaskStart {
        total_steps: lengths.len() as u64,
    });
    for length in lengths {
        let input = match plan.mode {
            SequenceMode::Random => InputSequence::Random {
                length,
                rng: &mut rng,
            },
            SequenceMode::MethionineLeucine => {
                InputSequence::Fixed(ProteinSequence::methionine_leucine(length)?)
            }
        };

        let outcome = retry::run_with_retry(EngineKind::LinearDesign, input, reporter, |s| {
            sweep.invoke(lineardesign.as_ref(), s)
        })?;
        let sequence = outcome.sequence;
        sweep.record(BenchmarkRecord::new(
            length,
            EngineKind::LinearDesign,
            &sequence,
            &outcome.result,
            outcome.attempts,
        ));

        for engine in &budgeted {
            let kind = engine.kind();
            let worst = slowest.get(&kind).copied().unwrap_or_default();
            if worst >= budget {
                debug!(%kind, length, worst, "Skipping engine over its time budget.");
                continue;
            }
            let result = sweep.invoke(engine.as_ref(), &sequence)?;
            slowest.insert(kind, worst.max(result.elapsed_seconds()));
            sweep.record(BenchmarkRecord::new(length, kind, &sequence, &result, 1));
        }

        let result = sweep.invoke(mrnafold.as_ref(), &sequence)?;
        sweep.record(BenchmarkRecord::new(
            length,
            EngineKind::MrnaFold,
            &sequence,
            &result,
            1,
        ));

        reporter.message(format!("length {length} done"));
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(records = sweep.records.len(), "Benchmark sweep finished.");
    Ok(sweep.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeInstall, fixture_table};
    use serial_test::serial;
    use std::sync::Mutex;

    fn mll_plan(min_length: usize, max_length: usize, step: usize) -> SweepPlan {
        SweepPlan {
            min_length,
            max_length,
            step,
            mode: SequenceMode::MethionineLeucine,
            ..SweepPlan::default()
        }
    }

    #[test]
    fn default_plan_sweeps_fifty_to_fifteen_hundred() {
        let plan = SweepPlan::default();
        let lengths: Vec<usize> = plan.lengths().collect();
        assert_eq!(lengths.len(), 30);
        assert_eq!(lengths.first(), Some(&50));
        assert_eq!(lengths.last(), Some(&1500));
        assert_eq!(plan.timeout, Duration::from_secs(3600));
        assert_eq!(plan.mode, SequenceMode::Random);
    }

    #[test]
    fn sequence_mode_parses_both_names() {
        assert_eq!("random".parse::<SequenceMode>(), Ok(SequenceMode::Random));
        assert_eq!(" MLL ".parse::<SequenceMode>(), Ok(SequenceMode::MethionineLeucine));
        assert!("protein".parse::<SequenceMode>().is_err());
        assert_eq!(SequenceMode::MethionineLeucine.to_string(), "mll");
    }

    #[test]
    fn invalid_plans_are_rejected_before_running() {
        let install = FakeInstall::new();
        let table = fixture_table();
        for plan in [
            mll_plan(3, 9, 0),
            mll_plan(10, 5, 1),
            SweepPlan {
                min_length: 1,
                ..SweepPlan::default()
            },
        ] {
            let result = run(&install.config(), &table, &plan, &ProgressReporter::new(), |_| {});
            assert!(matches!(result, Err(BenchmarkError::InvalidPlan(_))), "{plan:?}");
        }
    }

    #[test]
    #[serial]
    fn mll_sweep_runs_every_engine_in_order_on_one_sequence() {
        let install = FakeInstall::new();
        let table = fixture_table();
        let records = run(
            &install.config(),
            &table,
            &mll_plan(3, 9, 3),
            &ProgressReporter::new(),
            |_| {},
        )
        .unwrap();

        assert_eq!(records.len(), 12);
        for (chunk, length) in records.chunks(4).zip([3, 6, 9]) {
            let engines: Vec<EngineKind> = chunk.iter().map(|r| r.engine).collect();
            assert_eq!(
                engines,
                vec![
                    EngineKind::LinearDesign,
                    EngineKind::CdsFold,
                    EngineKind::Derna,
                    EngineKind::MrnaFold
                ]
            );
            let expected = format!("M{}", "L".repeat(length - 1));
            assert!(chunk.iter().all(|r| r.length == length && r.sequence == expected));
            assert!(chunk.iter().all(|r| r.attempts == 1 && r.elapsed_seconds >= 0.0));
        }
    }

    #[test]
    #[serial]
    fn slow_engines_are_dropped_once_over_budget() {
        let install = FakeInstall::new();
        let table = fixture_table();
        let plan = SweepPlan {
            timeout: Duration::from_nanos(1),
            ..mll_plan(2, 6, 2)
        };
        let records = run(&install.config(), &table, &plan, &ProgressReporter::new(), |_| {})
            .unwrap();

        let budgeted_lengths = |kind| {
            records
                .iter()
                .filter(|r| r.engine == kind)
                .map(|r| r.length)
                .collect::<Vec<_>>()
        };
        assert_eq!(budgeted_lengths(EngineKind::CdsFold), vec![2]);
        assert_eq!(budgeted_lengths(EngineKind::Derna), vec![2]);
        assert_eq!(budgeted_lengths(EngineKind::LinearDesign), vec![2, 4, 6]);
        assert_eq!(budgeted_lengths(EngineKind::MrnaFold), vec![2, 4, 6]);
    }

    #[test]
    #[serial]
    fn random_sweep_retries_and_shares_regenerated_sequence() {
        let install = FakeInstall::new();
        install.fail_lineardesign(1);
        let table = fixture_table();
        let plan = SweepPlan {
            min_length: 10,
            max_length: 10,
            step: 1,
            seed: 42,
            ..SweepPlan::default()
        };
        let seen = Mutex::new(Vec::new());
        let records = run(&install.config(), &table, &plan, &ProgressReporter::new(), |r| {
            seen.lock().unwrap().push(r.engine)
        })
        .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(seen.into_inner().unwrap().len(), 4);
        assert_eq!(records[0].attempts, 2);
        let attempted = install.lineardesign_inputs();
        assert_eq!(attempted.len(), 2);
        assert_ne!(attempted[0], attempted[1]);
        let final_sequence = attempted[1].to_string();
        assert!(records.iter().all(|r| r.sequence == final_sequence));
        assert!(final_sequence.starts_with('M') && final_sequence.ends_with('*'));
    }

    #[test]
    #[serial]
    fn same_seed_draws_same_sequences() {
        let table = fixture_table();
        let plan = SweepPlan {
            min_length: 5,
            max_length: 15,
            step: 5,
            seed: 7,
            ..SweepPlan::default()
        };
        let sequences = || {
            let install = FakeInstall::new();
            run(&install.config(), &table, &plan, &ProgressReporter::new(), |_| {})
                .unwrap()
                .into_iter()
                .map(|r| r.sequence)
                .collect::<Vec<_>>()
        };
        assert_eq!(sequences(), sequences());
    }

    #[test]
    #[serial]
    fn engine_failure_stops_the_sweep() {
        let install = FakeInstall::new();
        install.replace_script(EngineKind::MrnaFold, "exit 2\n");
        let table = fixture_table();
        let mut count = 0;
        let result = run(
            &install.config(),
            &table,
            &mll_plan(3, 6, 3),
            &ProgressReporter::new(),
            |_| count += 1,
        );
        assert!(matches!(
            result,
            Err(BenchmarkError::Engine(EngineError::Invocation {
                engine: EngineKind::MrnaFold,
                ..
            }))
        ));
        assert_eq!(count, 3);
    }
}
