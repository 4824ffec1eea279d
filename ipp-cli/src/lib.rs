//! IPPcode22 interpreter front end: flag parsing and run wiring for the
//! `interpret` binary.

pub mod commands;
pub mod config;

pub use commands::{run, CliError};
pub use config::{parse_args, Config, Invocation, UsageError, USAGE};
