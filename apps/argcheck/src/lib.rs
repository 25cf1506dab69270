//! # argcheck
//!
//! Command-line front end for [`argcheck_core`]: document loading,
//! configuration, the schema pre-check and the source liveness probe.
//! The binary in `main.rs` only sets up logging and dispatches to [`cli`].

pub mod cli;
pub mod config;
pub mod loader;
pub mod probe;
