//! The message contract of the interactive session.
//!
//! Every asynchronous outcome and every cross-pane request is a variant of
//! [`Msg`]. The event loop is the only consumer; tasks post messages and
//! never touch shared state. State transitions emit [`Effect`]s, which the
//! loop interprets by spawning tasks. Keeping effects as data keeps the
//! state machine pure and directly testable.

use crate::api::GeneratedCommand;

/// The ordered panes of the session. Focus cycles through them in
/// declaration order and wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Prompt,
    Output,
    Flags,
    Explain,
}

impl Pane {
    pub const ALL: [Pane; 4] = [Pane::Prompt, Pane::Output, Pane::Flags, Pane::Explain];

    /// The next pane in the fixed cycle order, wrapping around.
    pub fn next(self) -> Pane {
        let idx = Pane::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Pane::ALL[(idx + 1) % Pane::ALL.len()]
    }
}

/// A submitted generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub language: String,
}

/// Messages processed by the event loop, in arrival order.
#[derive(Debug, Clone)]
pub enum Msg {
    /// The prompt pane submitted free text.
    PromptSubmitted(String),
    /// A generation task finished.
    GenerationCompleted(Result<GeneratedCommand, String>),
    /// The user answered the execute-confirmation question.
    ConfirmDecision(bool),
    /// An execution task finished with captured output.
    ExecutionCompleted(Result<String, String>),
    /// An explanation task finished.
    ExplainCompleted(Result<String, String>),
    /// Writing the outfile failed. Non-fatal.
    PersistenceFailed(String),
    /// A component requested a focus change.
    Focus(Pane),
    /// Periodic redraw tick (spinner animation).
    Tick,
}

/// Side effects requested by a state transition, interpreted by the event
/// loop as spawned tasks or focus updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Generate(GenerationRequest),
    Execute(String),
    Explain { command: String, language: String },
    Persist { path: String, command: String },
    Focus(Pane),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_cycles_in_fixed_order_and_wraps() {
        assert_eq!(Pane::Prompt.next(), Pane::Output);
        assert_eq!(Pane::Output.next(), Pane::Flags);
        assert_eq!(Pane::Flags.next(), Pane::Explain);
        assert_eq!(Pane::Explain.next(), Pane::Prompt);
    }
}
