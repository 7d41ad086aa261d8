//! Turns one input line into either a variable assignment or a [`Pipeline`].
//!
//! The line is handled in this order:
//! 1. everything from the first `#` is dropped and the rest is trimmed;
//! 2. `NAME=value` (no whitespace right before the first `=`) assigns a variable;
//! 3. anything else is expanded, split on `|`, and each segment is parsed into a
//!    [`Command`] with its redirections and resolved executable.

use crate::command::{Command, Pipeline};
use crate::env::VariableStore;
use crate::error::{ParseError, Result, ShellError};
use crate::expand::expand_variables;
use crate::external::resolve_executable;
use std::path::PathBuf;

/// Result of parsing a line that did not fail.
#[derive(Debug)]
pub enum ParsedLine {
    /// A variable was assigned; there is nothing to execute.
    Assignment,
    /// Stages ready for the executor.
    Pipeline(Pipeline),
}

/// Parse `line`, committing assignments to `vars`.
///
/// `max_len` bounds the length of the line after variable expansion.
pub fn parse_line(line: &str, vars: &mut VariableStore, max_len: Option<usize>) -> Result<ParsedLine> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return Err(ShellError::EmptyLine);
    }

    if let Some(eq) = line.find('=') {
        if eq == 0 {
            return Err(ShellError::InvalidAssignment);
        }
        let before = line[..eq].chars().next_back();
        if before.is_some_and(|c| !c.is_whitespace()) {
            let (name, value) = (&line[..eq], &line[eq + 1..]);
            vars.set(name, value)?;
            tracing::debug!(name, value, "assigned variable");
            return Ok(ParsedLine::Assignment);
        }
    }

    let expanded = expand_variables(line, vars, max_len)?;
    parse_pipeline(&expanded, vars).map(ParsedLine::Pipeline)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_pipeline(line: &str, vars: &VariableStore) -> Result<Pipeline> {
    let mut stages = Vec::new();
    let mut prior_stage_piped = false;
    let mut output_declared = false;

    for segment in line.split('|') {
        if output_declared {
            // Output redirection ends the pipeline; later stages are dropped.
            break;
        }
        let command = parse_command(segment, vars, prior_stage_piped)?;
        output_declared = command.redir_out.is_some();
        prior_stage_piped = true;
        stages.push(command);
    }

    Pipeline::new(stages).ok_or_else(|| ParseError::EmptyPipeline.into())
}

fn parse_command(segment: &str, vars: &VariableStore, prior_stage_piped: bool) -> Result<Command> {
    let redirections = Redirections::extract(segment)?;
    if redirections.input.is_some() && prior_stage_piped {
        return Err(ParseError::InputAfterPipe.into());
    }

    let mut words = redirections.words.split_whitespace();
    let name = words.next().ok_or(ParseError::EmptyCommand)?;
    let exec = resolve_executable(name, vars)?;

    let mut args = vec![exec.display_name()];
    args.extend(words.map(str::to_string));

    let mut command = Command::new(exec, args);
    command.redir_in = redirections.input.map(PathBuf::from);
    if let Some((path, append)) = redirections.output {
        command.redir_out = Some(PathBuf::from(path));
        command.redir_append = append;
    }
    Ok(command)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Input,
    Output,
    Append,
}

impl Operator {
    fn symbol(self) -> &'static str {
        match self {
            Operator::Input => "<",
            Operator::Output => ">",
            Operator::Append => ">>",
        }
    }
}

/// A segment split into its command words and redirection targets.
#[derive(Debug, PartialEq, Eq)]
struct Redirections<'a> {
    words: &'a str,
    input: Option<&'a str>,
    /// Target and whether it appends.
    output: Option<(&'a str, bool)>,
}

impl<'a> Redirections<'a> {
    /// At most one `<` and at most one of `>`/`>>` are accepted, in either order.
    /// Each target runs up to the next operator or the end of the segment and must be a
    /// single word.
    fn extract(segment: &'a str) -> std::result::Result<Self, ParseError> {
        let mut ops: Vec<(usize, Operator)> = Vec::with_capacity(2);

        let mut inputs = segment.match_indices('<').map(|(pos, _)| pos);
        if let Some(pos) = inputs.next() {
            if inputs.next().is_some() {
                return Err(ParseError::MultipleInputs);
            }
            ops.push((pos, Operator::Input));
        }

        let outputs: Vec<usize> = segment.match_indices('>').map(|(pos, _)| pos).collect();
        match outputs.as_slice() {
            [] => {}
            [pos] => ops.push((*pos, Operator::Output)),
            [first, second] if *second == first + 1 => ops.push((*first, Operator::Append)),
            _ => return Err(ParseError::ConflictingOutputs),
        }

        ops.sort_by_key(|(pos, _)| *pos);

        let words_end = ops.first().map_or(segment.len(), |(pos, _)| *pos);
        let mut result = Redirections {
            words: &segment[..words_end],
            input: None,
            output: None,
        };

        for (i, (pos, op)) in ops.iter().enumerate() {
            let start = pos + op.symbol().len();
            let end = ops.get(i + 1).map_or(segment.len(), |(next, _)| *next);
            let target = segment[start..end].trim();
            if target.is_empty() {
                return Err(ParseError::MissingTarget(op.symbol()));
            }
            if target.contains(char::is_whitespace) {
                return Err(ParseError::TrailingWords(target.to_string()));
            }
            match op {
                Operator::Input => result.input = Some(target),
                Operator::Output => result.output = Some((target, false)),
                Operator::Append => result.output = Some((target, true)),
            }
        }

        Ok(result)
    }
}
