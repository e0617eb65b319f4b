//! # Workflows Module
//!
//! High-level entry points that drive the engines end to end.
//!
//! ## Overview
//!
//! Each workflow builds the engine bridges from a [`BenchConfig`](crate::engine::config::BenchConfig),
//! generates or accepts the protein input, invokes the engines strictly in sequence and
//! reports progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! ## Architecture
//!
//! - **Cross-Validation** ([`validate`]) - Runs the selected engines on the same protein and
//!   checks their designs against each other, the codon table and the reference
//!   free-energy model. Disagreements are collected, never raised.
//! - **Benchmark Sweep** ([`benchmark`]) - Measures wall-clock time and peak memory of every
//!   engine over a range of protein lengths, dropping engines that exceed the time budget.

pub mod benchmark;
pub mod validate;
