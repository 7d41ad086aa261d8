//! A small line-oriented command interpreter.
//!
//! A line goes through variable expansion (`$NAME`, `${NAME}`), is split into a
//! pipeline of commands with `<`, `>` and `>>` redirections, each command is resolved
//! through `PATH`, and the pipeline runs as one child process per stage connected by
//! pipes. The status of the last stage is the status of the line.
//!
//! The main entry point is [`Interpreter`], which owns the variable store and runs
//! single lines, script files or an interactive prompt. The lower-level pieces
//! ([`parser::parse_line`], [`executor::execute`]) can be used on their own.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod executor;
pub mod expand;
pub mod external;
mod interpreter;
pub mod parser;

pub use config::ShellConfig;
pub use error::{ExecError, ParseError, ShellError};
pub use interpreter::{Interpreter, LineOutcome};

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Serializes tests that change the process working directory.
    pub fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn unique_temp_dir(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{}_{}_{}_{}", tag, std::process::id(), seq, nanos));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }
}
