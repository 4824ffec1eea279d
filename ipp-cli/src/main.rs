//! `interpret`: execute an IPPcode22 program from its XML representation.
//!
//! Exit codes:
//! - 0-49: the program's EXIT operand (0 when it runs off the end)
//! - 10: invalid invocation parameters
//! - 11: a source or input file cannot be read
//! - 31: source is not well-formed XML
//! - 32: malformed program structure
//! - 52-58: semantic and runtime errors
//! - 99: internal error

use std::process;

use ipp_cli::{parse_args, CliError, Invocation, USAGE};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args)
        .map_err(CliError::from)
        .and_then(|invocation| match invocation {
            Invocation::Help => {
                println!("{}", USAGE.trim_end());
                Ok(0)
            }
            Invocation::Run(config) => ipp_cli::run(&config),
        });

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(e.exit_code());
        }
    }
}

/// Diagnostics go to stderr, filtered by `IPP_LOG`; silent when unset.
fn init_logging() {
    let filter = EnvFilter::try_from_env("IPP_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
