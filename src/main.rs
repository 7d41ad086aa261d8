use argh::FromArgs;
use pipeline_shell::{Interpreter, LineOutcome, ShellConfig, ShellError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Line-oriented command interpreter with pipes, redirection and variables.
struct Options {
    /// run a single line and exit with its status
    #[argh(option, short = 'c')]
    command: Option<String>,

    /// stop a script at the first line that fails
    #[argh(switch, short = 'e')]
    errexit: bool,

    /// maximum length of a line after variable expansion
    #[argh(option)]
    max_line: Option<usize>,

    /// start with an empty variable store instead of importing PATH and HOME
    #[argh(switch)]
    no_import: bool,

    /// script files to run in order; without any, an interactive prompt is started
    #[argh(positional)]
    scripts: Vec<PathBuf>,
}

impl Options {
    fn config(&self) -> ShellConfig {
        let mut config = ShellConfig {
            max_line_length: self.max_line,
            errexit: self.errexit,
            ..ShellConfig::default()
        };
        if self.no_import {
            config.import_vars.clear();
        }
        config
    }
}

fn status_byte(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options: Options = argh::from_env();
    let mut shell = Interpreter::new(options.config());

    if let Some(line) = &options.command {
        return match shell.run_line(line) {
            Ok(LineOutcome::Completed(code)) => status_byte(code),
            Ok(LineOutcome::Assigned) | Err(ShellError::EmptyLine) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("psh: {}: {}", line.trim(), e);
                ExitCode::FAILURE
            }
        };
    }

    if options.scripts.is_empty() {
        if let Err(e) = shell.repl() {
            eprintln!("psh: {}", e);
            return ExitCode::FAILURE;
        }
        return status_byte(shell.last_status());
    }

    for script in &options.scripts {
        if let Err(e) = shell.run_script(script) {
            eprintln!("psh: {:#}", e);
            return ExitCode::FAILURE;
        }
    }
    status_byte(shell.last_status())
}
