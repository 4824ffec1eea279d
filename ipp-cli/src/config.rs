//! Command-line flag handling.

use std::path::PathBuf;

use ipp_common::ErrorCategory;
use thiserror::Error;

/// Where the program source and the READ input come from. `None` means
/// standard input; at most one of the two is ever `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: Option<PathBuf>,
    pub input: Option<PathBuf>,
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(Config),
}

/// Invalid invocation parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("{0} requires a value (use {0}=FILE)")]
    MissingValue(&'static str),

    #[error("{0} given more than once")]
    Repeated(&'static str),

    #[error("--help cannot be combined with other arguments")]
    HelpWithOthers,

    #[error("at least one of --source or --input is required")]
    NothingToRead,
}

impl UsageError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::InvalidParameters
    }
}

pub const USAGE: &str = "\
Usage: interpret [--source=FILE] [--input=FILE]
       interpret --help

Executes an IPPcode22 program given in its XML representation.

Options:
  --source=FILE   XML source of the program
  --input=FILE    lines consumed by READ
  --help          print this message

At least one of --source and --input is required; the other is read from
standard input.

Environment:
  IPP_LOG         tracing filter for diagnostics on stderr (e.g. debug)
";

/// Parse the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation, UsageError> {
    if args.iter().any(|a| a == "--help") {
        return if args.len() == 1 {
            Ok(Invocation::Help)
        } else {
            Err(UsageError::HelpWithOthers)
        };
    }

    let mut source = None;
    let mut input = None;
    for arg in args {
        let (flag, slot) = if arg.starts_with("--source") {
            ("--source", &mut source)
        } else if arg.starts_with("--input") {
            ("--input", &mut input)
        } else {
            return Err(UsageError::UnknownArgument(arg.clone()));
        };

        let value = match arg[flag.len()..].strip_prefix('=') {
            Some(value) if !value.is_empty() => value,
            Some(_) => return Err(UsageError::MissingValue(flag)),
            None if arg.len() == flag.len() => return Err(UsageError::MissingValue(flag)),
            None => return Err(UsageError::UnknownArgument(arg.clone())),
        };
        if slot.is_some() {
            return Err(UsageError::Repeated(flag));
        }
        *slot = Some(PathBuf::from(value));
    }

    if source.is_none() && input.is_none() {
        return Err(UsageError::NothingToRead);
    }
    Ok(Invocation::Run(Config { source, input }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation, UsageError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args(&args)
    }

    #[test]
    fn source_only() {
        assert_eq!(
            parse(&["--source=prog.xml"]),
            Ok(Invocation::Run(Config {
                source: Some(PathBuf::from("prog.xml")),
                input: None,
            }))
        );
    }

    #[test]
    fn both_files() {
        assert_eq!(
            parse(&["--input=in.txt", "--source=p.xml"]),
            Ok(Invocation::Run(Config {
                source: Some(PathBuf::from("p.xml")),
                input: Some(PathBuf::from("in.txt")),
            }))
        );
    }

    #[test]
    fn value_may_contain_equals() {
        assert_eq!(
            parse(&["--source=a=b.xml"]),
            Ok(Invocation::Run(Config {
                source: Some(PathBuf::from("a=b.xml")),
                input: None,
            }))
        );
    }

    #[test]
    fn help() {
        assert_eq!(parse(&["--help"]), Ok(Invocation::Help));
        assert_eq!(
            parse(&["--help", "--source=p.xml"]),
            Err(UsageError::HelpWithOthers)
        );
    }

    #[test]
    fn nothing_to_read() {
        assert_eq!(parse(&[]), Err(UsageError::NothingToRead));
    }

    #[test]
    fn malformed_flags() {
        assert_eq!(
            parse(&["--source"]),
            Err(UsageError::MissingValue("--source"))
        );
        assert_eq!(
            parse(&["--input="]),
            Err(UsageError::MissingValue("--input"))
        );
        assert_eq!(
            parse(&["--sourcefile=x"]),
            Err(UsageError::UnknownArgument("--sourcefile=x".to_string()))
        );
        assert_eq!(
            parse(&["-s", "x"]),
            Err(UsageError::UnknownArgument("-s".to_string()))
        );
        assert_eq!(
            parse(&["--source=a", "--source=b"]),
            Err(UsageError::Repeated("--source"))
        );
    }

    #[test]
    fn usage_errors_exit_10() {
        assert_eq!(UsageError::NothingToRead.category().exit_code(), 10);
    }
}
