//! Fasting tracker CLI library.
//!
//! This crate provides the CLI interface for the fasting tracker. Each
//! subcommand is a thin presentation adapter over the shared calculator and
//! formatter in `fast-core`, so every surface derives the same values from
//! the same persisted fact.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
