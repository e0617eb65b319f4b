//! # mrnabench Core Library
//!
//! A harness for benchmarking and cross-validating external mRNA sequence design
//! engines. Each engine takes a protein sequence and returns a coding RNA sequence,
//! its secondary structure, the minimum free energy (MFE) of that structure and,
//! for most engines, a codon adaptation index (CAI).
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Codon`, `AminoAcid`,
//!   `ProteinSequence`, `FoldResult`), the codon usage table, the on-disk input
//!   artifacts each engine consumes, and the reference free-energy model interface.
//!
//! - **[`engine`]: The Bridge.** Drives the engines as child processes with
//!   concurrent memory sampling, translates canonical inputs into each engine's
//!   artifacts, parses each engine's output back into a `FoldResult`, and retries
//!   the engine known to abort non-deterministically.
//!
//! - **[`workflows`]: The Public API.** The cross-validation harness, which checks
//!   that all engines agree with each other and with the reference model, and the
//!   benchmark sweep, which measures time and memory over growing protein lengths.

pub mod core;
pub mod engine;
pub mod workflows;

#[cfg(test)]
pub(crate) mod testing;
