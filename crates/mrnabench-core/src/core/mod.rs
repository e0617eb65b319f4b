//! # Core Module
//!
//! This module provides the stateless building blocks shared by every engine bridge
//! and workflow in mrnabench.
//!
//! ## Architecture
//!
//! - **Sequence Models** ([`models`]) - Codons, amino acids, protein sequences,
//!   dot-bracket structures and the canonical `FoldResult`
//! - **Codon Usage** ([`tables`]) - Per-species codon frequency tables and the
//!   `CodonLookup` capability used to compute adaptation weights and CAI
//! - **Input Artifacts** ([`io`]) - FASTA records, codon CSV layouts and key/value
//!   configuration files written to disk for the engines to read by path
//! - **Reference Model** ([`reference`]) - The trusted free-energy evaluator used only
//!   for validation

pub mod io;
pub mod models;
pub mod reference;
pub mod tables;
