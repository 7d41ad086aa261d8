/// Runtime options for an [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Upper bound on the length of a line after variable expansion. `None` is unbounded.
    pub max_line_length: Option<usize>,
    /// Process environment variables copied into the variable store at startup.
    pub import_vars: Vec<String>,
    /// Stop running a script at the first line that fails.
    pub errexit: bool,
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_line_length: None,
            import_vars: vec!["PATH".to_string(), "HOME".to_string()],
            errexit: false,
            prompt: "psh$ ".to_string(),
        }
    }
}
