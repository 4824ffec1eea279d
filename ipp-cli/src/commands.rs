//! Wires the configured files to the loader and the VM.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use ipp_common::ErrorCategory;
use ipp_loader::LoadError;
use ipp_vm::{InputLines, RuntimeError, VM};
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, UsageError};

/// Anything that stops an `interpret` run, with its exit status.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("cannot read '{}': {source}", .path.display())]
    File { path: PathBuf, source: io::Error },

    #[error("cannot read standard input: {0}")]
    Stdin(io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CliError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CliError::Usage(e) => e.category(),
            CliError::File { .. } | CliError::Stdin(_) => ErrorCategory::InputFile,
            CliError::Load(e) => e.category(),
            CliError::Runtime(e) => e.category(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }
}

/// Load and execute the configured program. Returns its exit code.
pub fn run(config: &Config) -> Result<i32, CliError> {
    let source = match &config.source {
        Some(path) => read_file(path)?,
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(CliError::Stdin)?;
            bytes
        }
    };
    let program = ipp_loader::load_bytes(&source)?;

    let code = match &config.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::File {
                path: path.clone(),
                source,
            })?;
            debug!(input = %path.display(), "reading input from file");
            VM::new(&program)
                .with_input(InputLines::new(BufReader::new(file)))
                .execute()?
        }
        None => ipp_vm::run(&program)?,
    };
    Ok(code)
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}
