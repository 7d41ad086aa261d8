use crate::command::ExitCode;
use crate::config::ShellConfig;
use crate::env::VariableStore;
use crate::error::ShellError;
use crate::executor;
use crate::parser::{self, ParsedLine};
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// What a successfully handled line did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A variable assignment; nothing was executed.
    Assigned,
    /// A pipeline ran and its last stage exited with this status.
    Completed(ExitCode),
}

/// A line-oriented command interpreter.
///
/// The interpreter owns the variable store; each line is parsed against it and the
/// resulting pipeline is executed before the next line is read.
///
/// Example
/// ```no_run
/// use pipeline_shell::{Interpreter, LineOutcome, ShellConfig};
/// let mut sh = Interpreter::new(ShellConfig::default());
/// sh.run_line("greeting=hello").unwrap();
/// let outcome = sh.run_line("echo $greeting world").unwrap();
/// assert_eq!(outcome, LineOutcome::Completed(0));
/// ```
pub struct Interpreter {
    vars: VariableStore,
    config: ShellConfig,
    last_status: ExitCode,
}

impl Interpreter {
    /// Create an interpreter whose variables are imported from the process environment
    /// as listed in `config.import_vars`.
    pub fn new(config: ShellConfig) -> Self {
        let vars = VariableStore::from_process_env(config.import_vars.as_slice());
        Self::with_variables(vars, config)
    }

    pub fn with_variables(vars: VariableStore, config: ShellConfig) -> Self {
        Self {
            vars,
            config,
            last_status: 0,
        }
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.vars
    }

    /// Status of the most recent pipeline.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Parse and run a single line.
    pub fn run_line(&mut self, line: &str) -> Result<LineOutcome, ShellError> {
        match parser::parse_line(line, &mut self.vars, self.config.max_line_length)? {
            ParsedLine::Assignment => Ok(LineOutcome::Assigned),
            ParsedLine::Pipeline(pipeline) => {
                let code = executor::execute(pipeline)?;
                self.last_status = code;
                Ok(LineOutcome::Completed(code))
            }
        }
    }

    /// Run every line of the script at `path`.
    ///
    /// Blank and comment-only lines are skipped. A failing line is reported as
    /// `path:line: reason`; the script then continues unless `errexit` is set.
    /// Returns the status of the last pipeline run.
    pub fn run_script(&mut self, path: &Path) -> anyhow::Result<ExitCode> {
        let file = File::open(path)
            .with_context(|| format!("can't open script {}", path.display()))?;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("can't read script {}", path.display()))?;
            match self.run_line(&line) {
                Ok(_) | Err(ShellError::EmptyLine) => {}
                Err(e) => {
                    eprintln!("{}:{}: {}", path.display(), index + 1, e);
                    self.last_status = 1;
                    if self.config.errexit {
                        let location = format!("{}:{}: {}", path.display(), index + 1, line);
                        return Err(anyhow::Error::new(e).context(location));
                    }
                }
            }
        }
        Ok(self.last_status)
    }

    /// Interactive read-eval loop with line editing and history.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    match self.run_line(&line) {
                        Ok(_) | Err(ShellError::EmptyLine) => {}
                        Err(e) => {
                            eprintln!("psh: {}: {}", line.trim(), e);
                            self.last_status = 1;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::unique_temp_dir;
    use std::fs;

    fn interpreter() -> Interpreter {
        let mut vars = VariableStore::new();
        vars.set("PATH", "/bin:/usr/bin").unwrap();
        Interpreter::with_variables(vars, ShellConfig::default())
    }

    #[test]
    fn test_assignment_then_use() {
        let dir = unique_temp_dir("interp_assign");
        let out = dir.join("out.txt");
        let mut sh = interpreter();

        assert_eq!(sh.run_line("word=hello").unwrap(), LineOutcome::Assigned);
        assert_eq!(sh.run_line(&format!("out={}", out.display())).unwrap(), LineOutcome::Assigned);
        assert_eq!(
            sh.run_line("echo $word ${word}again > $out").unwrap(),
            LineOutcome::Completed(0)
        );
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello helloagain\n");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_last_status_tracks_tail() {
        let mut sh = interpreter();
        assert_eq!(sh.run_line("true | false").unwrap(), LineOutcome::Completed(1));
        assert_eq!(sh.last_status(), 1);
        sh.run_line("x=1").unwrap();
        assert_eq!(sh.last_status(), 1);
        sh.run_line("false | true").unwrap();
        assert_eq!(sh.last_status(), 0);
    }

    #[test]
    fn test_errors_leave_state_untouched() {
        let mut sh = interpreter();
        sh.run_line("a=1").unwrap();
        assert!(matches!(sh.run_line("echo $b"), Err(ShellError::UndefinedVariable(_))));
        assert!(matches!(sh.run_line("1bad=2"), Err(ShellError::InvalidName(_))));
        assert_eq!(sh.variables().get("a"), Some("1"));
        assert_eq!(sh.variables().len(), 2);
    }

    #[test]
    fn test_max_line_length_applies_to_expansion() {
        let mut vars = VariableStore::new();
        vars.set("PATH", "/bin:/usr/bin").unwrap();
        let config = ShellConfig {
            max_line_length: Some(16),
            ..ShellConfig::default()
        };
        let mut sh = Interpreter::with_variables(vars, config);
        sh.run_line("long=aaaaaaaaaaaaaaaaaaaa").unwrap();
        assert!(matches!(sh.run_line("echo $long"), Err(ShellError::LineTooLong(16))));
    }

    #[test]
    fn test_run_script_continues_after_errors() {
        let dir = unique_temp_dir("interp_script");
        let out = dir.join("out.txt");
        let script = dir.join("script.psh");
        fs::write(
            &script,
            format!(
                "# setup\n\
                 msg=from script\n\
                 \n\
                 echo $undefined\n\
                 echo $msg > {out}   # write it\n\
                 false\n",
                out = out.display()
            ),
        )
        .unwrap();

        let mut sh = interpreter();
        let status = sh.run_script(&script).unwrap();
        assert_eq!(status, 1);
        assert_eq!(fs::read_to_string(&out).unwrap(), "from script\n");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_run_script_errexit_stops() {
        let dir = unique_temp_dir("interp_errexit");
        let out = dir.join("out.txt");
        let script = dir.join("script.psh");
        fs::write(
            &script,
            format!("echo $nope\necho reached > {}\n", out.display()),
        )
        .unwrap();

        let mut vars = VariableStore::new();
        vars.set("PATH", "/bin:/usr/bin").unwrap();
        let config = ShellConfig {
            errexit: true,
            ..ShellConfig::default()
        };
        let mut sh = Interpreter::with_variables(vars, config);
        assert!(sh.run_script(&script).is_err());
        assert!(!out.exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_run_script_missing_file() {
        let mut sh = interpreter();
        let missing = std::env::temp_dir().join("no_such_script_for_interp_test.psh");
        assert!(sh.run_script(&missing).is_err());
    }
}
