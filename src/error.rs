//! Error types shared by the parser, the resolver and the executor.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single line could not be turned into an exit status.
///
/// Every variant is recoverable: the line is abandoned and the interpreter keeps
/// running with its variables and working directory untouched.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Nothing left after comment removal and trimming.
    #[error("empty line")]
    EmptyLine,
    /// A variable name outside `[A-Za-z_]+`.
    #[error("invalid variable name `{0}`")]
    InvalidName(String),
    /// An assignment line starting with `=`.
    #[error("assignment is missing a variable name")]
    InvalidAssignment,
    /// A `${` without a closing `}`.
    #[error("unterminated `${{` in variable expansion")]
    MalformedExpansion,
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    /// The expanded line grew past the configured limit.
    #[error("expanded line exceeds {0} bytes")]
    LineTooLong(usize),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("PATH variable is not set")]
    PathNotConfigured,
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Syntax problems found while splitting a line into pipeline stages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no commands in pipeline")]
    EmptyPipeline,
    #[error("empty command between pipes")]
    EmptyCommand,
    #[error("more than one input redirection")]
    MultipleInputs,
    #[error("conflicting output redirections")]
    ConflictingOutputs,
    #[error("missing file name after `{0}`")]
    MissingTarget(&'static str),
    #[error("unexpected words after redirection target `{0}`")]
    TrailingWords(String),
    #[error("cannot redirect input of a command that reads from a pipe")]
    InputAfterPipe,
}

/// Failures while wiring and launching the processes of a pipeline.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot open `{}` for reading: {source}", .path.display())]
    OpenInput { path: PathBuf, source: io::Error },
    #[error("cannot open `{}` for writing: {source}", .path.display())]
    OpenOutput { path: PathBuf, source: io::Error },
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("cannot start `{}`: {source}", .path.display())]
    Spawn { path: PathBuf, source: io::Error },
    #[error("cannot wait for child process: {0}")]
    Wait(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;
