use crate::command::ExitCode;
use anyhow::{Context, Result};
use nix::unistd::{Uid, User};
use std::env;
use std::path::PathBuf;

/// Change the working directory of the interpreter process.
/// If no target is provided, changes to the home directory of the invoking user.
pub struct Cd {
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl Cd {
    /// Build from a stage's argument list; `args[0]` is the command name and only
    /// `args[1]` is used.
    pub fn from_args(args: &[String]) -> Self {
        Cd {
            target: args.get(1).cloned(),
        }
    }

    pub fn execute(self) -> Result<()> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => home_dir()?,
        };
        env::set_current_dir(&target)
            .with_context(|| format!("cd: can't chdir to {}", target.display()))?;
        tracing::debug!(dir = %target.display(), "changed directory");
        Ok(())
    }

    /// Run and map the outcome to a shell status, reporting failures on stderr.
    pub fn run(self) -> ExitCode {
        match self.execute() {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{:#}", e);
                1
            }
        }
    }
}

/// Home directory of the user running the interpreter, from the user database.
fn home_dir() -> Result<PathBuf> {
    let uid = Uid::current();
    let user = User::from_uid(uid)
        .context("cd: can't look up current user")?
        .with_context(|| format!("cd: no user database entry for uid {}", uid))?;
    Ok(user.dir)
}
