//! Grid carbon estimator CLI library.
//!
//! This crate provides the CLI interface for the grid carbon estimator.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
