//! Codon usage tables.
//!
//! A [`codon_usage::CodonUsageTable`] is loaded once per run from a per-species
//! reference and then passed by reference into every component that needs it. The
//! rest of the crate only depends on the [`codon_usage::CodonLookup`] capability.

pub mod codon_usage;
