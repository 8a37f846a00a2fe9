//! Pane models for the interactive session.
//!
//! Panes hold display state and translate focused key events into messages
//! or session-context mutations. They know nothing about drawing; rendering
//! lives in [`super::render`].

use crossterm::event::{KeyCode, KeyEvent};

use crate::session::SessionContext;
use crate::tui::message::Msg;

const PROMPT_CHAR_LIMIT: usize = 500;

/// Free-text prompt input. Enter emits a submitted-prompt event.
pub struct PromptInput {
    buffer: String,
}

impl PromptInput {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Handle a key while focused. Returns a message when the prompt is
    /// submitted.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Enter => Some(Msg::PromptSubmitted(self.buffer.clone())),
            KeyCode::Backspace => {
                self.buffer.pop();
                None
            }
            KeyCode::Char(c) => {
                if self.buffer.len() < PROMPT_CHAR_LIMIT {
                    self.buffer.push(c);
                }
                None
            }
            _ => None,
        }
    }
}

impl Default for PromptInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows of the flags pane, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRow {
    AutoExecute,
    Confirm,
    Explain,
    Outfile,
    Language,
}

impl FlagRow {
    pub const ALL: [FlagRow; 5] = [
        FlagRow::AutoExecute,
        FlagRow::Confirm,
        FlagRow::Explain,
        FlagRow::Outfile,
        FlagRow::Language,
    ];
}

/// Toggle and text-entry rows for session flags. Mutations land directly on
/// the session context; this pane is the only writer of these fields.
pub struct FlagsPane {
    cursor: usize,
}

impl FlagsPane {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    pub fn cursor_row(&self) -> FlagRow {
        FlagRow::ALL[self.cursor]
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut SessionContext) {
        match key.code {
            KeyCode::Up => {
                self.cursor = if self.cursor == 0 {
                    FlagRow::ALL.len() - 1
                } else {
                    self.cursor - 1
                };
            }
            KeyCode::Down => {
                self.cursor = (self.cursor + 1) % FlagRow::ALL.len();
            }
            KeyCode::Enter => self.toggle(ctx),
            KeyCode::Backspace => match self.cursor_row() {
                FlagRow::Outfile => {
                    ctx.outfile.pop();
                    ctx.save_output = !ctx.outfile.is_empty();
                }
                FlagRow::Language => {
                    ctx.language.pop();
                    if ctx.language.is_empty() {
                        ctx.language = ctx.default_language.clone();
                    }
                }
                _ => {}
            },
            KeyCode::Char(c) => match self.cursor_row() {
                FlagRow::Outfile => {
                    ctx.outfile.push(c);
                    ctx.save_output = true;
                }
                FlagRow::Language => {
                    // First typed character replaces the default.
                    if ctx.language == ctx.default_language {
                        ctx.language.clear();
                    }
                    ctx.language.push(c);
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn toggle(&self, ctx: &mut SessionContext) {
        match self.cursor_row() {
            FlagRow::AutoExecute => ctx.auto_execute = !ctx.auto_execute,
            FlagRow::Confirm => ctx.confirm_exec = !ctx.confirm_exec,
            FlagRow::Explain => ctx.explain = !ctx.explain,
            FlagRow::Outfile => {
                if ctx.save_output {
                    ctx.save_output = false;
                    ctx.outfile.clear();
                }
            }
            FlagRow::Language => {}
        }
    }

    /// Whether the row's flag reads as set, for the checkbox rendering.
    pub fn row_selected(&self, row: FlagRow, ctx: &SessionContext) -> bool {
        match row {
            FlagRow::AutoExecute => ctx.auto_execute,
            FlagRow::Confirm => ctx.confirm_exec,
            FlagRow::Explain => ctx.explain,
            FlagRow::Outfile => ctx.save_output,
            FlagRow::Language => ctx.language != ctx.default_language,
        }
    }
}

impl Default for FlagsPane {
    fn default() -> Self {
        Self::new()
    }
}

/// Passive display of explanation results.
pub struct ExplainPane {
    content: String,
}

impl ExplainPane {
    pub fn new() -> Self {
        Self {
            content: "Explanations of generated commands appear here when the explain flag is set."
                .to_string(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn handle(&mut self, msg: &Msg) {
        if let Msg::ExplainCompleted(result) = msg {
            self.content = match result {
                Ok(text) => text.clone(),
                Err(err) => format!("Could not fetch an explanation: {}", err),
            };
        }
    }
}

impl Default for ExplainPane {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn context() -> SessionContext {
        SessionContext::from_config(&Config::default())
    }

    #[test]
    fn test_prompt_input_collects_text_and_submits() {
        let mut input = PromptInput::new();
        for c in "ls".chars() {
            assert!(input.handle_key(key(KeyCode::Char(c))).is_none());
        }

        let msg = input.handle_key(key(KeyCode::Enter));
        match msg {
            Some(Msg::PromptSubmitted(text)) => assert_eq!(text, "ls"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_prompt_input_backspace() {
        let mut input = PromptInput::new();
        input.handle_key(key(KeyCode::Char('a')));
        input.handle_key(key(KeyCode::Char('b')));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn test_flags_toggle_roundtrip() {
        let mut ctx = context();
        let mut pane = FlagsPane::new();

        // Cursor starts on auto-execute.
        pane.handle_key(key(KeyCode::Enter), &mut ctx);
        assert!(ctx.auto_execute);
        pane.handle_key(key(KeyCode::Enter), &mut ctx);
        assert!(!ctx.auto_execute);
    }

    #[test]
    fn test_flags_cursor_wraps_both_ways() {
        let mut ctx = context();
        let mut pane = FlagsPane::new();

        pane.handle_key(key(KeyCode::Up), &mut ctx);
        assert_eq!(pane.cursor_row(), FlagRow::Language);
        pane.handle_key(key(KeyCode::Down), &mut ctx);
        assert_eq!(pane.cursor_row(), FlagRow::AutoExecute);
    }

    #[test]
    fn test_outfile_entry_sets_save_flag() {
        let mut ctx = context();
        let mut pane = FlagsPane::new();
        for _ in 0..3 {
            pane.handle_key(key(KeyCode::Down), &mut ctx);
        }
        assert_eq!(pane.cursor_row(), FlagRow::Outfile);

        for c in "out.sh".chars() {
            pane.handle_key(key(KeyCode::Char(c)), &mut ctx);
        }
        assert!(ctx.save_output);
        assert_eq!(ctx.outfile, "out.sh");

        // Emptying the filename clears the flag.
        for _ in 0.."out.sh".len() {
            pane.handle_key(key(KeyCode::Backspace), &mut ctx);
        }
        assert!(!ctx.save_output);
    }

    #[test]
    fn test_language_entry_replaces_default_and_restores_it() {
        let mut ctx = context();
        let mut pane = FlagsPane::new();
        for _ in 0..4 {
            pane.handle_key(key(KeyCode::Down), &mut ctx);
        }
        assert_eq!(pane.cursor_row(), FlagRow::Language);

        pane.handle_key(key(KeyCode::Char('z')), &mut ctx);
        assert_eq!(ctx.language, "z");

        pane.handle_key(key(KeyCode::Backspace), &mut ctx);
        assert_eq!(ctx.language, ctx.default_language);
    }

    #[test]
    fn test_explain_pane_shows_result_and_error() {
        let mut pane = ExplainPane::new();

        pane.handle(&Msg::ExplainCompleted(Ok("It lists files.".to_string())));
        assert_eq!(pane.content(), "It lists files.");

        pane.handle(&Msg::ExplainCompleted(Err("timeout".to_string())));
        assert!(pane.content().contains("timeout"));
    }
}
