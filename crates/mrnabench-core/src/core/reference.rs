//! Interface to the trusted free-energy evaluator used to validate engine output.
//!
//! The reference model never designs sequences. It answers two questions about an RNA
//! sequence: what is the free energy of a given structure, and which structure does the
//! model itself consider optimal. A command-line implementation lives in
//! [`crate::engine::vienna`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Reference model could not be run: {0}")]
    Unavailable(String),
    #[error("Reference model exited with code {exit_code:?}: {stderr}")]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("Could not read reference model output: {0}")]
    MalformedOutput(String),
}

pub trait ReferenceModel {
    /// Free energy of `structure` folded on `rna_sequence`, in kcal/mol.
    fn free_energy(&self, rna_sequence: &str, structure: &str) -> Result<f64, ReferenceError>;

    /// The model's own minimum free energy structure for `rna_sequence`, in dot-bracket form.
    fn predict_mfe_structure(&self, rna_sequence: &str) -> Result<String, ReferenceError>;
}
