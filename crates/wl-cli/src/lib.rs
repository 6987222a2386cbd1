//! Work log CLI library.
//!
//! This crate provides the command-line interface for `wl`.

mod cli;
pub mod commands;
mod config;

pub use cli::{CategoryArg, Cli, Commands, KindArg, TaskAction};
pub use config::Config;
