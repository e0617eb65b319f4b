use thiserror::Error;

use super::engines::EngineKind;
use super::process::ProcessError;
use crate::core::io::traits::ArtifactError;
use crate::core::models::result::ResultShapeError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Missing expected marker '{0}' in engine output")]
    MissingMarker(&'static str),

    #[error("Invalid number '{value}' after marker '{marker}'")]
    InvalidNumber { marker: &'static str, value: String },

    #[error("Engine output ended before the {0} line")]
    Truncated(&'static str),

    #[error("Malformed result: {0}")]
    Shape(#[from] ResultShapeError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{engine} failed on '{sequence}' with exit code {exit_code:?}: {stderr}")]
    Invocation {
        engine: EngineKind,
        sequence: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Could not parse {engine} output for '{sequence}': {source}")]
    Parse {
        engine: EngineKind,
        sequence: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to prepare {engine} input artifacts: {source}")]
    Artifact {
        engine: EngineKind,
        #[source]
        source: ArtifactError,
    },

    #[error("Could not run {engine}: {source}")]
    Spawn {
        engine: EngineKind,
        #[source]
        source: ProcessError,
    },
}

impl EngineError {
    pub fn engine(&self) -> EngineKind {
        match self {
            Self::Invocation { engine, .. }
            | Self::Parse { engine, .. }
            | Self::Artifact { engine, .. }
            | Self::Spawn { engine, .. } => *engine,
        }
    }

    /// Whether the engine itself failed, as opposed to the harness around it.
    ///
    /// Only these failures can change outcome when the input sequence changes.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Self::Invocation { .. } | Self::Parse { .. })
    }
}
