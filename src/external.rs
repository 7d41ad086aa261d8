use crate::command::Executable;
use crate::env::VariableStore;
use crate::error::{Result, ShellError};
use std::fs;
use std::path::{Path, PathBuf};

pub const PATH_VAR: &str = "PATH";
const CD: &str = "cd";

/// Resolve a typed command name the way the interpreter launches it.
///
/// Behavior:
/// - `cd`: the built-in, without touching the filesystem.
/// - Name containing `/`: returned unchanged; existence is checked at launch time.
/// - Otherwise: the directories of the `PATH` variable are listed in order and the
///   first entry named exactly `name` wins.
///
/// Fails with [`ShellError::PathNotConfigured`] when the store has no `PATH` and with
/// [`ShellError::CommandNotFound`] when no directory has a match.
pub fn resolve_executable(name: &str, vars: &VariableStore) -> Result<Executable> {
    if name == CD {
        return Ok(Executable::Cd);
    }
    let search_paths = vars.get(PATH_VAR).ok_or(ShellError::PathNotConfigured)?;
    if name.contains('/') {
        return Ok(Executable::Program(PathBuf::from(name)));
    }
    find_in_path(search_paths, name)
        .map(Executable::Program)
        .ok_or_else(|| ShellError::CommandNotFound(name.to_string()))
}

fn find_in_path(search_paths: &str, name: &str) -> Option<PathBuf> {
    search_paths
        .split(':')
        .filter(|dir| !dir.is_empty())
        .find_map(|dir| find_in_dir(Path::new(dir), name))
}

fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable PATH directory");
            return None;
        }
    };
    for entry in entries {
        match entry {
            Ok(entry) if entry.file_name() == name => return Some(dir.join(name)),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "error while listing PATH directory");
                return None;
            }
        }
    }
    None
}
