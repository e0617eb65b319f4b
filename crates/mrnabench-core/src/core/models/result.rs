use super::codon::{Codon, ModelError};
use super::structure::{self, StructureError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResultShapeError {
    #[error("RNA sequence contains invalid nucleotide '{symbol}' at position {position}")]
    InvalidNucleotide { position: usize, symbol: char },
    #[error("Invalid structure: {0}")]
    Structure(#[from] StructureError),
    #[error("RNA sequence length {rna} does not match structure length {structure}")]
    LengthMismatch { rna: usize, structure: usize },
    #[error("MFE is not a finite number: {0}")]
    NonFiniteMfe(f64),
    #[error("CAI {0} is outside (0, 1]")]
    CaiOutOfRange(f64),
}

/// Wall-clock time and peak resident memory of one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceUsage {
    pub elapsed_seconds: f64,
    /// `None` when the process exited before the first memory sample was taken.
    pub peak_memory_bytes: Option<u64>,
}

/// The normalized result of one engine invocation on one protein sequence.
///
/// Instances are only built through [`FoldResult::new`], which enforces the shape
/// invariants: an `{A, U, C, G}` sequence, a balanced dot-bracket structure of the same
/// length, a finite MFE and, when reported, a CAI in `(0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldResult {
    rna_sequence: String,
    structure: String,
    mfe: f64,
    cai: Option<f64>,
    elapsed_seconds: f64,
    peak_memory_bytes: Option<u64>,
}

impl FoldResult {
    pub fn new(
        rna_sequence: impl Into<String>,
        structure: impl Into<String>,
        mfe: f64,
        cai: Option<f64>,
        usage: ResourceUsage,
    ) -> Result<Self, ResultShapeError> {
        let rna_sequence = rna_sequence.into();
        let structure = structure.into();

        if let Some((position, symbol)) = rna_sequence
            .chars()
            .enumerate()
            .find(|(_, c)| !matches!(c, 'A' | 'U' | 'C' | 'G'))
        {
            return Err(ResultShapeError::InvalidNucleotide { position, symbol });
        }
        structure::validate(&structure)?;
        if rna_sequence.len() != structure.len() {
            return Err(ResultShapeError::LengthMismatch {
                rna: rna_sequence.len(),
                structure: structure.len(),
            });
        }
        if !mfe.is_finite() {
            return Err(ResultShapeError::NonFiniteMfe(mfe));
        }
        if let Some(value) = cai {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ResultShapeError::CaiOutOfRange(value));
            }
        }

        Ok(Self {
            rna_sequence,
            structure,
            mfe,
            cai,
            elapsed_seconds: usage.elapsed_seconds,
            peak_memory_bytes: usage.peak_memory_bytes,
        })
    }

    pub fn rna_sequence(&self) -> &str {
        &self.rna_sequence
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }

    /// Minimum free energy in kcal/mol.
    pub fn mfe(&self) -> f64 {
        self.mfe
    }

    /// `None` when the engine does not report a CAI, which is distinct from a computed zero.
    pub fn cai(&self) -> Option<f64> {
        self.cai
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn peak_memory_bytes(&self) -> Option<u64> {
        self.peak_memory_bytes
    }

    pub fn usage(&self) -> ResourceUsage {
        ResourceUsage {
            elapsed_seconds: self.elapsed_seconds,
            peak_memory_bytes: self.peak_memory_bytes,
        }
    }

    pub fn codons(&self) -> Result<Vec<Codon>, ModelError> {
        Codon::segment(&self.rna_sequence)
    }
}
