//! Bridges to the four external design engines.
//!
//! Every engine is driven the same way: [`Engine::prepare`] writes its input artifacts
//! and describes the command, the [`ProcessRunner`] executes it, and [`Engine::parse`]
//! turns the raw text the engine produced into a [`ParsedFold`]. [`invoke`] ties the
//! three together and guarantees the artifacts are removed on every path.

mod cdsfold;
mod derna;
mod lineardesign;
mod mrnafold;
pub(crate) mod parsing;

pub use cdsfold::CdsFold;
pub use derna::Derna;
pub use lineardesign::LinearDesign;
pub use mrnafold::MrnaFold;

use super::config::BenchConfig;
use super::error::{EngineError, ParseError};
use super::process::{ProcessOutput, ProcessRunner, ProcessSpec};
use crate::core::io::traits::{ArtifactError, TempArtifact};
use crate::core::models::protein::ProteinSequence;
use crate::core::models::result::{FoldResult, ResourceUsage};
use crate::core::tables::codon_usage::CodonLookup;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EngineKind {
    CdsFold,
    Derna,
    LinearDesign,
    MrnaFold,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown engine '{0}' (expected one of: cdsfold, derna, lineardesign, mrnafold)")]
pub struct UnknownEngine(pub String);

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::CdsFold,
        EngineKind::Derna,
        EngineKind::LinearDesign,
        EngineKind::MrnaFold,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EngineKind::CdsFold => "CDSfold",
            EngineKind::Derna => "DERNA",
            EngineKind::LinearDesign => "LinearDesign",
            EngineKind::MrnaFold => "mRNAfold",
        }
    }

    /// The engine that aborts non-deterministically and is run through the retry policy.
    pub fn is_flaky(self) -> bool {
        self == EngineKind::LinearDesign
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownEngine(s.to_string()))
    }
}

impl Serialize for EngineKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Fields an engine reports, before resource usage is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFold {
    pub rna_sequence: String,
    pub structure: String,
    pub mfe: f64,
    pub cai: Option<f64>,
}

impl ParsedFold {
    pub fn into_result(self, usage: ResourceUsage) -> Result<FoldResult, ParseError> {
        Ok(FoldResult::new(
            self.rna_sequence,
            self.structure,
            self.mfe,
            self.cai,
            usage,
        )?)
    }
}

/// A command ready to run, together with the temporary files it reads and writes.
#[derive(Debug)]
pub struct PreparedRun {
    pub spec: ProcessSpec,
    inputs: Vec<TempArtifact>,
    output: Option<TempArtifact>,
}

impl PreparedRun {
    pub fn new(spec: ProcessSpec) -> Self {
        Self {
            spec,
            inputs: Vec::new(),
            output: None,
        }
    }

    pub fn with_input(mut self, artifact: TempArtifact) -> Self {
        self.inputs.push(artifact);
        self
    }

    /// Parse this file instead of standard output.
    pub fn with_output(mut self, artifact: TempArtifact) -> Self {
        self.output = Some(artifact);
        self
    }

    fn raw_output(&self, process: &ProcessOutput) -> Result<String, ArtifactError> {
        match &self.output {
            Some(file) => file.read_to_string(),
            None => Ok(process.stdout.clone()),
        }
    }

    fn discard(self) {
        self.inputs.into_iter().for_each(TempArtifact::discard);
        if let Some(output) = self.output {
            output.discard();
        }
    }
}

pub trait Engine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Writes the input artifacts for `protein` and describes the command to run.
    fn prepare(
        &self,
        protein: &ProteinSequence,
        table: &dyn CodonLookup,
    ) -> Result<PreparedRun, ArtifactError>;

    /// Extracts the design from the engine's raw output text.
    fn parse(&self, raw: &str) -> Result<ParsedFold, ParseError>;

    /// Removes files the engine writes on its own accord.
    fn clean_up(&self) {}
}

pub fn engine_for(kind: EngineKind, config: &BenchConfig) -> Box<dyn Engine> {
    let root = config.install_path(kind);
    match kind {
        EngineKind::CdsFold => Box::new(CdsFold::new(root)),
        EngineKind::Derna => Box::new(Derna::new(root, config.lambdas.derna)),
        EngineKind::LinearDesign => {
            Box::new(LinearDesign::new(root, config.lambdas.lineardesign))
        }
        EngineKind::MrnaFold => Box::new(MrnaFold::new(
            root,
            config.lambdas.mrnafold,
            config.mrnafold_parallel,
        )),
    }
}

/// Runs `engine` on `protein` and normalizes its output.
///
/// Input artifacts, the output file and any engine litter are removed before this
/// returns, whether or not the invocation succeeded.
#[instrument(level = "debug", skip_all, fields(engine = %engine.kind(), length = protein.len()))]
pub fn invoke(
    engine: &dyn Engine,
    runner: &ProcessRunner,
    protein: &ProteinSequence,
    table: &dyn CodonLookup,
) -> Result<FoldResult, EngineError> {
    let kind = engine.kind();
    let prepared = engine
        .prepare(protein, table)
        .map_err(|source| EngineError::Artifact {
            engine: kind,
            source,
        })?;

    let collected = runner.run(&prepared.spec).map(|process| {
        let raw = prepared.raw_output(&process);
        (process, raw)
    });
    prepared.discard();
    engine.clean_up();

    let (process, raw) = collected.map_err(|source| EngineError::Spawn {
        engine: kind,
        source,
    })?;
    if !process.success() {
        warn!(
            exit_code = ?process.exit_code,
            stderr = %process.stderr.trim(),
            "Engine exited with failure."
        );
        return Err(EngineError::Invocation {
            engine: kind,
            sequence: protein.to_string(),
            exit_code: process.exit_code,
            stderr: process.stderr,
        });
    }
    let raw = raw.map_err(|source| EngineError::Artifact {
        engine: kind,
        source,
    })?;

    let result = engine
        .parse(&raw)
        .and_then(|parsed| parsed.into_result(process.usage))
        .map_err(|source| EngineError::Parse {
            engine: kind,
            sequence: protein.to_string(),
            source,
        })?;
    debug!(
        mfe = result.mfe(),
        cai = ?result.cai(),
        elapsed_seconds = result.elapsed_seconds(),
        "Engine run parsed."
    );
    Ok(result)
}
