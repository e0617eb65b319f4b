//! Provides the on-disk input artifacts consumed by the design engines.
//!
//! The engines read their inputs by path, so every artifact is written to a
//! temporary file, flushed and synced before the engine starts, and removed once the
//! invocation is over. Each format implements the [`traits::InputArtifact`] trait.

pub mod codon_csv;
pub mod fasta;
pub mod fold_config;
pub mod traits;
