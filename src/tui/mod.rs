//! Interactive terminal session.
//!
//! A single-threaded loop owns the terminal. Key events and the outcomes of
//! background tasks both arrive as [`Msg`] values on one queue; the
//! generation state machine turns each message into a list of effects, and
//! the loop interprets effects by spawning tokio tasks that report back
//! through the same queue.

pub mod generation;
pub mod message;
pub mod panes;
mod render;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::CommandService;
use crate::executor::ShellExecutor;
use crate::output::{copy_to_clipboard, write_command_file};
use crate::session::SessionContext;
use crate::tui::generation::{GenState, GenerationPane};
use crate::tui::message::{Effect, Msg, Pane};
use crate::tui::panes::{ExplainPane, FlagsPane, PromptInput};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const TASK_DEADLINE: Duration = Duration::from_secs(60);

pub struct App {
    pub(crate) focus: Pane,
    pub(crate) prompt: PromptInput,
    pub(crate) generation: GenerationPane,
    pub(crate) flags: FlagsPane,
    pub(crate) explain: ExplainPane,
    pub(crate) ctx: SessionContext,
    pub(crate) spinner_frame: usize,
    should_quit: bool,
}

impl App {
    fn new(ctx: SessionContext) -> Self {
        App {
            focus: Pane::Prompt,
            prompt: PromptInput::new(),
            generation: GenerationPane::new(),
            flags: FlagsPane::new(),
            explain: ExplainPane::new(),
            ctx,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// Feed one message through every pane. The explain pane listens
    /// passively, the generation pane returns effects, and a focus change
    /// lands here regardless of which pane is focused.
    fn dispatch(
        &mut self,
        msg: Msg,
        service: &Arc<dyn CommandService>,
        tx: &mpsc::UnboundedSender<Msg>,
    ) {
        self.explain.handle(&msg);
        let effects = self.generation.handle(&msg, &self.ctx);
        match msg {
            Msg::Focus(pane) => self.focus = pane,
            Msg::Tick => self.spinner_frame = self.spinner_frame.wrapping_add(1),
            _ => {}
        }
        for effect in effects {
            self.interpret(effect, service, tx);
        }
    }

    fn interpret(
        &mut self,
        effect: Effect,
        service: &Arc<dyn CommandService>,
        tx: &mpsc::UnboundedSender<Msg>,
    ) {
        match effect {
            Effect::Generate(request) => {
                info!(prompt = %request.prompt, "requesting command generation");
                let service = Arc::clone(service);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let outcome = tokio::time::timeout(
                        TASK_DEADLINE,
                        service.generate(&request.prompt, &request.language),
                    )
                    .await;
                    let result = match outcome {
                        Ok(Ok(generated)) => Ok(generated),
                        Ok(Err(err)) => Err(err.to_string()),
                        Err(_) => Err("command generation timed out".to_string()),
                    };
                    let _ = tx.send(Msg::GenerationCompleted(result));
                });
            }
            Effect::Execute(command) => {
                info!(%command, "executing generated command");
                let tx = tx.clone();
                tokio::spawn(async move {
                    let outcome = tokio::time::timeout(
                        TASK_DEADLINE,
                        tokio::task::spawn_blocking(move || {
                            ShellExecutor::new().execute(&command)
                        }),
                    )
                    .await;
                    let result = match outcome {
                        Ok(Ok(Ok(output))) => Ok(output),
                        Ok(Ok(Err(err))) => Err(err.to_string()),
                        Ok(Err(join_err)) => Err(join_err.to_string()),
                        Err(_) => Err("command execution timed out".to_string()),
                    };
                    let _ = tx.send(Msg::ExecutionCompleted(result));
                });
            }
            Effect::Explain { command, language } => {
                let service = Arc::clone(service);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let outcome = tokio::time::timeout(
                        TASK_DEADLINE,
                        service.explain(&command, &language),
                    )
                    .await;
                    let result = match outcome {
                        Ok(Ok(text)) => Ok(text),
                        Ok(Err(err)) => Err(err.to_string()),
                        Err(_) => Err("explanation timed out".to_string()),
                    };
                    let _ = tx.send(Msg::ExplainCompleted(result));
                });
            }
            Effect::Persist { path, command } => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let write = tokio::task::spawn_blocking(move || {
                        write_command_file(&path, &command)
                    })
                    .await;
                    match write {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => {
                            let _ = tx.send(Msg::PersistenceFailed(err.to_string()));
                        }
                        Err(join_err) => {
                            let _ = tx.send(Msg::PersistenceFailed(join_err.to_string()));
                        }
                    }
                });
            }
            Effect::Focus(pane) => {
                self.focus = pane;
            }
        }
    }

    fn handle_key(
        &mut self,
        key: crossterm::event::KeyEvent,
        service: &Arc<dyn CommandService>,
        tx: &mpsc::UnboundedSender<Msg>,
    ) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Global bindings win over whatever pane is focused.
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Tab, _) => {
                self.dispatch(Msg::Focus(self.focus.next()), service, tx);
                return;
            }
            (KeyCode::Char('y'), KeyModifiers::CONTROL) => {
                let command = self.generation.command();
                if !command.is_empty() {
                    if let Err(err) = copy_to_clipboard(command) {
                        warn!(error = %err, "clipboard copy failed");
                    }
                }
                return;
            }
            _ => {}
        }

        match self.focus {
            Pane::Prompt => {
                if let Some(msg) = self.prompt.handle_key(key) {
                    self.dispatch(msg, service, tx);
                }
            }
            Pane::Output => {
                // While confirming, only 'y' consents; every other key declines.
                if self.generation.state() == GenState::WaitForUserConfirm {
                    let yes = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
                    self.dispatch(Msg::ConfirmDecision(yes), service, tx);
                }
            }
            Pane::Flags => self.flags.handle_key(key, &mut self.ctx),
            Pane::Explain => {}
        }
    }
}

/// Run the interactive session until the user quits.
pub async fn run(
    service: Arc<dyn CommandService>,
    ctx: SessionContext,
    initial_prompt: Option<String>,
) -> Result<()> {
    enable_raw_mode().context("failed to enable raw terminal mode")?;
    io::stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("failed to initialise terminal")?;

    let result = event_loop(&mut terminal, service, ctx, initial_prompt).await;

    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: Arc<dyn CommandService>,
    ctx: SessionContext,
    initial_prompt: Option<String>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Msg>();
    let mut app = App::new(ctx);

    if let Some(prompt) = initial_prompt {
        app.dispatch(Msg::PromptSubmitted(prompt), &service, &tx);
    }

    while !app.should_quit {
        terminal
            .draw(|frame| render::draw(frame, &app))
            .context("failed to draw frame")?;

        while let Ok(msg) = rx.try_recv() {
            app.dispatch(msg, &service, &tx);
        }

        if event::poll(EVENT_POLL_INTERVAL).context("failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                app.handle_key(key, &service, &tx);
            }
        }

        app.dispatch(Msg::Tick, &service, &tx);
    }

    info!("interactive session closed");
    Ok(())
}
