//! # Core Models Module
//!
//! Data structures shared by every engine bridge and workflow.
//!
//! ## Key Components
//!
//! - [`codon`] - Ribonucleotide triplets and the amino-acid alphabet (20 residues plus stop)
//! - [`protein`] - Protein sequences, including random and deterministic generators
//! - [`structure`] - Dot-bracket secondary structure validation
//! - [`result`] - The canonical `FoldResult` every engine output is normalized into

pub mod codon;
pub mod protein;
pub mod result;
pub mod structure;
