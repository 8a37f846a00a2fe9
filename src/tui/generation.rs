//! The generation state machine: one cycle from prompt to idle.
//!
//! The machine is cyclic; every outcome, success or failure, collapses back
//! to `WaitForPrompt`. That guarantees at most one generation cycle is ever
//! open and that a late message from an abandoned cycle finds the machine in
//! a state that no longer accepts it, so a slow superseded generation can
//! never corrupt a newer cycle.

use tracing::warn;

use crate::session::SessionContext;
use crate::tui::message::{Effect, GenerationRequest, Msg, Pane};

const PLACEHOLDER: &str = "Enter a prompt to generate a command.";
const WAITING: &str = "Waiting for next prompt...";
const EMPTY_OUTPUT: &str = "Command response was empty";

/// Lifecycle states of a generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenState {
    /// Idle; the only state that accepts a new prompt.
    WaitForPrompt,
    /// A generation task is in flight.
    WaitForCommand,
    /// Command shown; waiting for the user's yes/no.
    WaitForUserConfirm,
    /// An execution task is in flight.
    WaitForExecution,
}

/// The output pane and its state machine.
pub struct GenerationPane {
    state: GenState,
    content: String,
    command: String,
    /// Credential/quota warning from the last generation, shown as a banner.
    warning: Option<String>,
}

impl GenerationPane {
    pub fn new() -> Self {
        Self {
            state: GenState::WaitForPrompt,
            content: PLACEHOLDER.to_string(),
            command: String::new(),
            warning: None,
        }
    }

    pub fn state(&self) -> GenState {
        self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// The most recent generated command, for clipboard copy.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether a task is in flight (drives the spinner).
    pub fn busy(&self) -> bool {
        matches!(self.state, GenState::WaitForCommand | GenState::WaitForExecution)
    }

    /// Advance the machine with one message.
    ///
    /// Messages that do not match the current state are ignored; only the
    /// returned effects carry work out of the machine.
    pub fn handle(&mut self, msg: &Msg, ctx: &SessionContext) -> Vec<Effect> {
        match msg {
            Msg::PromptSubmitted(prompt) if self.state == GenState::WaitForPrompt => {
                self.on_prompt(prompt, ctx)
            }
            Msg::GenerationCompleted(result) if self.state == GenState::WaitForCommand => {
                self.on_generated(result, ctx)
            }
            Msg::ConfirmDecision(yes) if self.state == GenState::WaitForUserConfirm => {
                self.on_confirm(*yes)
            }
            Msg::ExecutionCompleted(result) if self.state == GenState::WaitForExecution => {
                self.on_executed(result)
            }
            Msg::PersistenceFailed(err) => {
                // Non-fatal in every state; the shown result stands.
                warn!("Could not save output: {}", err);
                self.warning = Some(format!("Could not save output: {}", err));
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_prompt(&mut self, prompt: &str, ctx: &SessionContext) -> Vec<Effect> {
        if prompt.trim().is_empty() {
            return vec![];
        }

        self.content = format!("Prompt: {}", prompt);
        self.warning = None;
        self.state = GenState::WaitForCommand;

        vec![Effect::Generate(GenerationRequest {
            prompt: prompt.to_string(),
            language: ctx.language.clone(),
        })]
    }

    fn on_generated(
        &mut self,
        result: &Result<crate::api::GeneratedCommand, String>,
        ctx: &SessionContext,
    ) -> Vec<Effect> {
        let generated = match result {
            Ok(generated) => generated,
            Err(err) => {
                warn!("Generation failed: {}", err);
                self.content = format!("Something went wrong generating the command: {}", err);
                self.command.clear();
                self.state = GenState::WaitForPrompt;
                return vec![Effect::Focus(Pane::Prompt)];
            }
        };

        self.command = generated.cmd.clone();
        self.warning = generated.warning();

        let mut effects = Vec::new();

        if ctx.confirm_exec {
            self.content = format!(
                "{}\n\nDo you wish to execute the below? (y/n)\n\n{}",
                self.content, self.command
            );
            self.state = GenState::WaitForUserConfirm;
        } else if ctx.should_auto_execute() {
            self.state = GenState::WaitForExecution;
            effects.push(Effect::Execute(self.command.clone()));
            effects.push(Effect::Focus(Pane::Prompt));
        } else {
            self.content = self.command.clone();
            self.state = GenState::WaitForPrompt;
            effects.push(Effect::Focus(Pane::Prompt));
        }

        // Fire-and-forget side tasks; neither gates the transition above.
        if ctx.explain && !self.command.is_empty() {
            effects.push(Effect::Explain {
                command: self.command.clone(),
                language: ctx.language.clone(),
            });
        }
        if ctx.save_output && !ctx.outfile.is_empty() {
            effects.push(Effect::Persist {
                path: ctx.outfile.clone(),
                command: self.command.clone(),
            });
        }

        effects
    }

    fn on_confirm(&mut self, yes: bool) -> Vec<Effect> {
        if yes {
            self.content.clear();
            self.state = GenState::WaitForExecution;
            vec![
                Effect::Execute(self.command.clone()),
                Effect::Focus(Pane::Prompt),
            ]
        } else {
            self.command.clear();
            self.content = WAITING.to_string();
            self.state = GenState::WaitForPrompt;
            vec![Effect::Focus(Pane::Prompt)]
        }
    }

    fn on_executed(&mut self, result: &Result<String, String>) -> Vec<Effect> {
        match result {
            Ok(output) => {
                self.content = if output.trim().is_empty() {
                    EMPTY_OUTPUT.to_string()
                } else {
                    output.clone()
                };
            }
            Err(err) => {
                warn!("Execution failed: {}", err);
                self.content = format!("Something went wrong executing the command: {}", err);
            }
        }
        self.state = GenState::WaitForPrompt;
        vec![Effect::Focus(Pane::Prompt)]
    }
}

impl Default for GenerationPane {
    fn default() -> Self {
        Self::new()
    }
}
