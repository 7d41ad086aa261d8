//! Variable substitution for `$NAME` and `${NAME}` references.
//!
//! Expansion is a single left-to-right pass over the line. It either substitutes every
//! reference or fails as a whole; a partially expanded line is never returned.

use crate::env::VariableStore;
use crate::error::{Result, ShellError};

struct Expander<'a> {
    input: Vec<char>,
    pos: usize,
    vars: &'a VariableStore,
    output: String,
    max_len: Option<usize>,
}

impl<'a> Expander<'a> {
    fn new(line: &str, vars: &'a VariableStore, max_len: Option<usize>) -> Self {
        Expander {
            input: line.chars().collect(),
            pos: 0,
            vars,
            output: String::with_capacity(line.len()),
            max_len,
        }
    }

    fn run(mut self) -> Result<String> {
        while let Some(ch) = self.read_char() {
            if ch == '$' {
                let name = if self.peek_char() == Some('{') {
                    self.read_char();
                    self.read_braced_name()?
                } else {
                    self.read_bare_name()
                };
                self.substitute(&name)?;
            } else {
                self.output.push(ch);
            }
            self.check_len()?;
        }
        Ok(self.output)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Everything up to the first `}`; the brace itself is consumed.
    fn read_braced_name(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(ch) = self.read_char() {
            if ch == '}' {
                return Ok(name);
            }
            name.push(ch);
        }
        Err(ShellError::MalformedExpansion)
    }

    /// Everything up to whitespace, the next `$` or the end of the line.
    /// The terminator is left in place so a following `$` starts a new reference.
    fn read_bare_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == '$' {
                break;
            }
            name.push(ch);
            self.pos += 1;
        }
        name
    }

    fn substitute(&mut self, name: &str) -> Result<()> {
        match self.vars.get(name) {
            Some(value) => {
                self.output.push_str(value);
                Ok(())
            }
            None => Err(ShellError::UndefinedVariable(name.to_string())),
        }
    }

    fn check_len(&self) -> Result<()> {
        match self.max_len {
            Some(limit) if self.output.len() > limit => Err(ShellError::LineTooLong(limit)),
            _ => Ok(()),
        }
    }
}

/// Replace every variable reference in `line` with its value from `vars`.
///
/// `max_len` caps the length in bytes of the expanded line; `None` leaves it unbounded.
pub fn expand_variables(line: &str, vars: &VariableStore, max_len: Option<usize>) -> Result<String> {
    Expander::new(line, vars, max_len).run()
}
