//! # Engine Module
//!
//! This module bridges mrnabench to the external mRNA design engines, providing everything
//! needed to run an engine as a child process and turn what it prints into a canonical
//! [`FoldResult`](crate::core::models::result::FoldResult).
//!
//! ## Overview
//!
//! Engines are opaque, pre-built programs. Each one expects its inputs in a different
//! on-disk layout and reports its design in a different textual layout. The engine module
//! hides those differences behind the [`engines::Engine`] trait and measures every run with
//! the same process runner, so results from different engines are directly comparable.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Installation root, engine directories, trade-off
//!   weights, tolerance and memory sampling interval
//! - **Process Runner** ([`process`]) - Child process execution with piped I/O, wall-clock
//!   timing and a concurrent memory sampler ([`monitor`])
//! - **Working Directory** ([`workdir`]) - Scoped working-directory override for engines that
//!   must run from their installation directory
//! - **Engine Bridges** ([`engines`]) - Input preparation and output parsing per engine
//! - **Retry Policy** ([`retry`]) - Two-state retry loop for the engine known to abort
//!   non-deterministically
//! - **Reference Model** ([`vienna`]) - ViennaRNA command-line implementation of the
//!   reference free-energy model
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine invocation and output parsing errors
//!
//! ## Concurrency
//!
//! Engines are invoked strictly one after another. Within one invocation exactly two units
//! run concurrently: the child process and a sampling thread polling its resident memory.

pub mod config;
pub mod engines;
pub mod error;
pub mod monitor;
pub mod process;
pub mod progress;
pub mod retry;
pub mod vienna;
pub mod workdir;
