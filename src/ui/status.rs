use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, Screen, ToastLevel};
use crate::editor::SaveStatus;

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Text for the save indicator. Saving shows a spinner frame only.
pub fn status_text(status: SaveStatus, spinner_frame: usize) -> String {
    match status {
        SaveStatus::Saving => SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()].to_string(),
        other => other.label().to_string(),
    }
}

pub fn status_style(status: SaveStatus) -> Style {
    match status {
        SaveStatus::Saving => Style::default().fg(Color::Cyan),
        SaveStatus::Failed => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        SaveStatus::Unsaved => Style::default().fg(Color::Yellow),
        SaveStatus::Saved => Style::default().fg(Color::Green),
    }
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let status = match model.screen {
        Screen::List => {
            let count = model.templates.len();
            let noun = if count == 1 { "template" } else { "templates" };
            let loading = if model.list_loading { "  [loading]" } else { "" };
            format!(
                " {count} {noun}{loading}  {}  n:new  m:menu  ?:help",
                model.api_url
            )
        }
        Screen::Edit => {
            let name = model
                .editor
                .as_ref()
                .map_or("", |editor| editor.template().name.as_str());
            format!(" {name}  Tab:field  Ctrl-t:snippets  Ctrl-s:save  Esc:back  F1:help")
        }
    };

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
