//! Declarative rendering of the four panes.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::message::Pane;
use crate::tui::panes::FlagRow;
use crate::tui::App;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn help_line(focus: Pane) -> &'static str {
    match focus {
        Pane::Prompt => "enter: submit prompt • tab: next pane • ctrl+y: copy command • esc: quit",
        Pane::Output => "y/n: confirm execution • tab: next pane • esc: quit",
        Pane::Flags => "enter: toggle flag • up/down: move • tab: next pane • esc: quit",
        Pane::Explain => "tab: next pane • esc: quit",
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(9),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_prompt(frame, chunks[0], app);
    draw_output(frame, chunks[1], app);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    draw_flags(frame, bottom[0], app);
    draw_explain(frame, bottom[1], app);

    let help = Paragraph::new(help_line(app.focus))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn draw_prompt(frame: &mut Frame, area: Rect, app: &App) {
    let text = if app.prompt.value().is_empty() && app.focus != Pane::Prompt {
        Line::from("Describe the command you need...")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Line::from(app.prompt.value())
    };
    let widget =
        Paragraph::new(text).block(pane_block("prompt", app.focus == Pane::Prompt));
    frame.render_widget(widget, area);
}

fn draw_output(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.generation.busy() {
        format!(
            "command {}",
            SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]
        )
    } else {
        "command".to_string()
    };

    let mut lines: Vec<Line> = app.generation.content().lines().map(Line::from).collect();
    if let Some(warning) = app.generation.warning() {
        lines.push(Line::from(""));
        lines.push(Line::from(warning).style(Style::default().fg(Color::Yellow)));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(pane_block(&title, app.focus == Pane::Output));
    frame.render_widget(widget, area);
}

fn draw_flags(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    for row in FlagRow::ALL {
        let cursor = if app.flags.cursor_row() == row && app.focus == Pane::Flags {
            ">"
        } else {
            " "
        };
        let checked = if app.flags.row_selected(row, &app.ctx) {
            "x"
        } else {
            " "
        };
        let label = match row {
            FlagRow::AutoExecute => "autoexecute".to_string(),
            FlagRow::Confirm => "confirm".to_string(),
            FlagRow::Explain => "explain".to_string(),
            FlagRow::Outfile => {
                if app.ctx.outfile.is_empty() {
                    "output <enter filename>".to_string()
                } else {
                    format!("output {}", app.ctx.outfile)
                }
            }
            FlagRow::Language => format!("language {}", app.ctx.language),
        };
        lines.push(Line::from(format!("{} [{}] {}", cursor, checked, label)));
    }

    let widget = Paragraph::new(lines).block(pane_block("flags", app.focus == Pane::Flags));
    frame.render_widget(widget, area);
}

fn draw_explain(frame: &mut Frame, area: Rect, app: &App) {
    let widget = Paragraph::new(app.explain.content())
        .wrap(Wrap { trim: false })
        .block(pane_block("explain", app.focus == Pane::Explain));
    frame.render_widget(widget, area);
}
