//! Mutable session state shared by the orchestrator components.

use crate::config::Config;

/// Flags and settings for one run.
///
/// Owned by the event loop; panes and the generation state machine read it,
/// and only the focused pane's handler mutates it. Asynchronous tasks never
/// touch it, they report outcomes as messages instead.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Ask before executing a generated command.
    pub confirm_exec: bool,
    /// Execute generated commands without asking.
    pub auto_execute: bool,
    /// Request an explanation for each generated command.
    pub explain: bool,
    /// Persist each generated command to `outfile`.
    pub save_output: bool,
    pub outfile: String,
    /// Target language for this run; starts as the configured default.
    pub language: String,
    /// Persisted default language.
    pub default_language: String,
}

impl SessionContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            confirm_exec: false,
            auto_execute: config.auto_execute,
            explain: false,
            save_output: false,
            outfile: String::new(),
            language: config.language.clone(),
            default_language: config.language.clone(),
        }
    }

    /// Whether a generated command should run without a confirmation prompt.
    /// Confirmation takes precedence over auto-execution.
    pub fn should_auto_execute(&self) -> bool {
        !self.confirm_exec && self.auto_execute
    }
}
