use crate::error::{Result, ShellError};
use regex::Regex;
use std::env as stdenv;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]+$").expect("variable name pattern is valid"));

/// Returns true when `name` is usable as a shell variable name (`[A-Za-z_]+`).
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// A single named value.
///
/// The name is fixed once the variable exists; only the value changes on re-assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    pub value: String,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shell-local variables used for `$NAME` expansion and `PATH` lookup.
///
/// Entries keep their creation order; iteration yields the most recently created
/// variable first. Names are unique within the store.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    vars: Vec<Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding copies of the named process environment variables.
    ///
    /// Variables that are unset, not valid unicode or have names outside
    /// `[A-Za-z_]+` are skipped.
    pub fn from_process_env<S: AsRef<str>>(names: &[S]) -> Self {
        let mut store = Self::new();
        for name in names {
            let name = name.as_ref();
            if let Ok(value) = stdenv::var(name) {
                if store.set(name, value).is_err() {
                    tracing::warn!(name, "skipping environment variable with invalid name");
                }
            }
        }
        store
    }

    /// Assign `value` to `name`, replacing the value in place when the name exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if !is_valid_name(name) {
            return Err(ShellError::InvalidName(name.to_string()));
        }
        let value = value.into();
        match self.vars.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.value = value,
            None => self.vars.push(Variable {
                name: name.to_string(),
                value,
            }),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// Iterate from the newest variable to the oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_var() {
        let mut vars = VariableStore::new();

        // initially absent
        assert_eq!(vars.get("GREETING"), None);

        vars.set("GREETING", "hello").unwrap();
        assert_eq!(vars.get("GREETING"), Some("hello"));
    }

    #[test]
    fn test_reassignment_replaces_in_place() {
        let mut vars = VariableStore::new();
        vars.set("a", "1").unwrap();
        vars.set("b", "2").unwrap();
        vars.set("a", "3").unwrap();

        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("a"), Some("3"));
        // position is kept: `b` is still the newest entry
        let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut vars = VariableStore::new();
        for name in ["", "A1", "with space", "dash-ed", "é"] {
            let err = vars.set(name, "x").unwrap_err();
            assert!(matches!(err, ShellError::InvalidName(n) if n == name));
        }
        assert!(vars.is_empty());
    }

    #[test]
    fn test_underscores_and_case_are_valid() {
        assert!(is_valid_name("_"));
        assert!(is_valid_name("Path_Var"));
        assert!(!is_valid_name("PATH2"));
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let mut vars = VariableStore::new();
        vars.set("EMPTY", "").unwrap();
        assert_eq!(vars.get("EMPTY"), Some(""));
    }

    #[test]
    fn test_from_process_env_reads_path() {
        let vars = VariableStore::from_process_env(&["PATH", "SOME_RANDOM_ENV_VAR_12345"]);
        assert!(vars.get("PATH").is_some());
        assert_eq!(vars.get("SOME_RANDOM_ENV_VAR_12345"), None);
    }
}
