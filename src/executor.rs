//! Runs a parsed [`Pipeline`] as one child process per stage.
//!
//! Adjacent stages are joined with anonymous pipes, the head may read from a file and
//! the tail may write to one. Every descriptor handed to a child is closed in the
//! interpreter right after that child is started, so readers see end-of-file as soon as
//! their writers exit.

use crate::builtin::Cd;
use crate::command::{Command, Endpoint, Executable, ExitCode, Pipeline};
use crate::error::{ExecError, Result};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::process::{Child, ExitStatus};

/// Exit status of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStatus {
    /// Process id, or `None` when no process was started for the stage.
    pub pid: Option<u32>,
    pub code: ExitCode,
}

/// Run `pipeline` and return the exit status of its last stage.
pub fn execute(pipeline: Pipeline) -> Result<ExitCode> {
    let statuses = run_pipeline(pipeline)?;
    Ok(statuses.last().map_or(0, |s| s.code))
}

/// Run `pipeline` and return the status of every stage, head first.
///
/// A pipeline headed by `cd` changes the interpreter's directory and runs nothing else.
pub fn run_pipeline(mut pipeline: Pipeline) -> Result<Vec<StageStatus>> {
    if pipeline.head().exec.is_builtin() {
        if pipeline.len() > 1 {
            tracing::debug!(dropped = pipeline.len() - 1, "cd ignores the rest of the pipeline");
        }
        let code = Cd::from_args(&pipeline.head().args).run();
        return Ok(vec![StageStatus { pid: None, code }]);
    }

    connect_pipes(pipeline.stages_mut())?;
    open_redirections(pipeline.stages_mut())?;

    tracing::debug!(stages = pipeline.len(), "launching pipeline");
    let launched = launch_all(pipeline)?;
    tracing::debug!("all stages launched");

    let statuses = wait_all(launched)?;
    tracing::debug!(?statuses, "pipeline finished");
    Ok(statuses)
}

/// One pipe per pair of neighbours: the left stage writes, the right stage reads.
fn connect_pipes(stages: &mut [Command]) -> std::result::Result<(), ExecError> {
    for i in 1..stages.len() {
        let (read, write) = pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?;
        stages[i - 1].stdout = Endpoint::Pipe(write);
        stages[i].stdin = Endpoint::Pipe(read);
    }
    Ok(())
}

/// Files named by the head's `<` and the tail's `>`/`>>` replace any pipe end.
fn open_redirections(stages: &mut [Command]) -> std::result::Result<(), ExecError> {
    if let Some(head) = stages.first_mut() {
        if let Some(path) = &head.redir_in {
            let file = File::open(path).map_err(|source| ExecError::OpenInput {
                path: path.clone(),
                source,
            })?;
            head.stdin = Endpoint::File(file);
        }
    }

    if let Some(tail) = stages.last_mut() {
        if let Some(path) = &tail.redir_out {
            let mut options = OpenOptions::new();
            options.write(true).create(true).mode(0o644);
            if tail.redir_append {
                options.append(true);
            } else {
                options.truncate(true);
            }
            let file = options.open(path).map_err(|source| ExecError::OpenOutput {
                path: path.clone(),
                source,
            })?;
            tail.stdout = Endpoint::File(file);
        }
    }
    Ok(())
}

enum Launched {
    Running(Child),
    /// The stage failed to start in a way that only concerns that stage.
    Failed(ExitCode),
}

enum LaunchError {
    Stage(ExitCode),
    Fatal(ExecError),
}

fn launch_all(pipeline: Pipeline) -> std::result::Result<Vec<Launched>, ExecError> {
    let mut launched = Vec::with_capacity(pipeline.len());
    let mut pending = pipeline.into_stages().into_iter();

    while let Some(stage) = pending.next() {
        match launch(stage) {
            Ok(child) => launched.push(Launched::Running(child)),
            Err(LaunchError::Stage(code)) => launched.push(Launched::Failed(code)),
            Err(LaunchError::Fatal(err)) => {
                // Close the remaining pipe ends so started stages can finish.
                drop(pending);
                reap(launched);
                return Err(err);
            }
        }
    }
    Ok(launched)
}

fn launch(stage: Command) -> std::result::Result<Child, LaunchError> {
    let Command {
        exec,
        args,
        stdin,
        stdout,
        ..
    } = stage;

    let path = match exec {
        Executable::Program(path) => path,
        Executable::Cd => {
            eprintln!("cd: cannot run inside a pipeline");
            return Err(LaunchError::Stage(1));
        }
    };

    tracing::debug!(
        path = %path.display(),
        argv = ?args,
        stdin = %stdin,
        stdout = %stdout,
        "starting stage"
    );

    // The builder owns the stage's endpoints and drops them right after the spawn.
    let spawned = std::process::Command::new(&path)
        .args(&args[1..])
        .stdin(stdin)
        .stdout(stdout)
        .spawn();

    spawned.map_err(|e| match launch_failure_status(&e) {
        Some(code) => {
            eprintln!("{}: {}", path.display(), e);
            LaunchError::Stage(code)
        }
        None => LaunchError::Fatal(ExecError::Spawn { path, source: e }),
    })
}

/// Exit status for failures of the exec step itself: 127 for a missing program,
/// 126 when it exists but cannot be run. `None` means the process could not be created.
fn launch_failure_status(e: &io::Error) -> Option<ExitCode> {
    match e.kind() {
        io::ErrorKind::NotFound => Some(127),
        io::ErrorKind::PermissionDenied => Some(126),
        _ => match e.raw_os_error() {
            Some(code) if code == Errno::ENOEXEC as i32 || code == Errno::EISDIR as i32 => {
                Some(126)
            }
            _ => None,
        },
    }
}

fn wait_all(launched: Vec<Launched>) -> std::result::Result<Vec<StageStatus>, ExecError> {
    let mut statuses = Vec::with_capacity(launched.len());
    let mut failure = None;

    for stage in launched {
        match stage {
            Launched::Failed(code) => statuses.push(StageStatus { pid: None, code }),
            Launched::Running(mut child) => match child.wait() {
                Ok(status) => statuses.push(StageStatus {
                    pid: Some(child.id()),
                    code: exit_code(status),
                }),
                Err(e) => {
                    failure.get_or_insert(ExecError::Wait(e));
                }
            },
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(statuses),
    }
}

fn reap(launched: Vec<Launched>) {
    for stage in launched {
        if let Launched::Running(mut child) = stage {
            if let Err(e) = child.wait() {
                tracing::warn!(pid = child.id(), error = %e, "failed to reap child");
            }
        }
    }
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        -1
    }
}
