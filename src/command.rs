use std::fmt;
use std::fs::File;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// What a command name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Executable {
    /// The `cd` built-in, run inside the interpreter process.
    Cd,
    /// An external program, as an absolute or relative path.
    Program(PathBuf),
}

impl Executable {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Executable::Cd)
    }

    /// The text used as `argv[0]`.
    pub fn display_name(&self) -> String {
        match self {
            Executable::Cd => "cd".to_string(),
            Executable::Program(path) => path.to_string_lossy().into_owned(),
        }
    }
}

/// Where a stage reads from or writes to.
#[derive(Debug, Default)]
pub enum Endpoint {
    /// Whatever the interpreter itself has open.
    #[default]
    Inherit,
    /// One end of a pipe shared with a neighbouring stage.
    Pipe(OwnedFd),
    /// A redirection file.
    File(File),
}

impl Endpoint {
    fn kind(&self) -> &'static str {
        match self {
            Endpoint::Inherit => "inherit",
            Endpoint::Pipe(_) => "pipe",
            Endpoint::File(_) => "file",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl From<Endpoint> for Stdio {
    fn from(endpoint: Endpoint) -> Stdio {
        match endpoint {
            Endpoint::Inherit => Stdio::inherit(),
            Endpoint::Pipe(fd) => Stdio::from(fd),
            Endpoint::File(file) => Stdio::from(file),
        }
    }
}

/// One stage of a pipeline.
///
/// `args[0]` is always the resolved executable, followed by the typed arguments.
#[derive(Debug)]
pub struct Command {
    pub exec: Executable,
    pub args: Vec<String>,
    pub stdin: Endpoint,
    pub stdout: Endpoint,
    pub redir_in: Option<PathBuf>,
    pub redir_out: Option<PathBuf>,
    pub redir_append: bool,
}

impl Command {
    pub fn new(exec: Executable, args: Vec<String>) -> Self {
        Self {
            exec,
            args,
            stdin: Endpoint::Inherit,
            stdout: Endpoint::Inherit,
            redir_in: None,
            redir_out: None,
            redir_append: false,
        }
    }

    pub fn redir_in(&self) -> Option<&Path> {
        self.redir_in.as_deref()
    }

    pub fn redir_out(&self) -> Option<&Path> {
        self.redir_out.as_deref()
    }
}

/// The stages parsed from one line, head first.
///
/// A pipeline is consumed by a single execution; dropping it closes every
/// descriptor its stages still hold.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Command>,
}

impl Pipeline {
    /// Returns `None` for an empty list of stages.
    pub fn new(stages: Vec<Command>) -> Option<Self> {
        if stages.is_empty() {
            None
        } else {
            Some(Self { stages })
        }
    }

    pub fn head(&self) -> &Command {
        &self.stages[0]
    }

    pub fn tail(&self) -> &Command {
        &self.stages[self.stages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Command] {
        &self.stages
    }

    pub(crate) fn stages_mut(&mut self) -> &mut [Command] {
        &mut self.stages
    }

    pub(crate) fn into_stages(self) -> Vec<Command> {
        self.stages
    }
}
