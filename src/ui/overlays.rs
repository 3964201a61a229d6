use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::app::Model;
use crate::editor::FieldBuffer;
use crate::menu::{ActionMenu, DELETE_FAILED, DELETE_WARNING, MenuAction, RENAME_FAILED};
use crate::snippets::SNIPPETS;

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White))
}

fn hint_style() -> Style {
    Style::default().fg(Color::Indexed(245))
}

fn error_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

/// The visible part of a single-line input plus the caret column within it.
fn input_view(buf: &FieldBuffer, width: u16) -> (String, u16) {
    let text = buf.text();
    let caret_byte = buf.cursor().col.min(text.len());
    let before = text.get(..caret_byte).unwrap_or_default();
    let caret_col = before.width();
    let width = usize::from(width.max(1));
    let skip = caret_col.saturating_sub(width - 1);
    let mut skipped = 0;
    let visible: String = text
        .chars()
        .skip_while(|c| {
            if skipped >= skip {
                return false;
            }
            skipped += c.to_string().width();
            true
        })
        .collect();
    let col = u16::try_from(caret_col - skip.min(caret_col)).unwrap_or(0);
    (visible, col)
}

pub fn render_menu(menu: &ActionMenu, frame: &mut Frame, area: Rect) {
    if menu.rename_surface().is_open() {
        render_rename_surface(menu, frame, area);
    } else if menu.delete_surface().is_open() {
        render_delete_surface(menu, frame, area);
    } else if menu.popover_open() {
        render_action_popover(menu, frame, area);
    }
}

fn render_action_popover(menu: &ActionMenu, frame: &mut Frame, area: Rect) {
    let popup = centered_popup_rect(28, 7, area);
    let selected = menu.popover_selected();
    let lines: Vec<Line> = MenuAction::ALL
        .iter()
        .enumerate()
        .map(|(idx, action)| {
            let style = if action == &MenuAction::Delete {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            let line = Line::styled(format!(" {} ", action.label()), style);
            if selected == Some(idx) {
                line.reversed()
            } else {
                line
            }
        })
        .chain(std::iter::once(Line::styled(" e/r/d · Esc", hint_style())))
        .collect();

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(popup_block(&menu.template().name)),
        popup,
    );
}

fn render_rename_surface(menu: &ActionMenu, frame: &mut Frame, area: Rect) {
    let surface = menu.rename_surface();
    let popup_width = area.width.saturating_sub(8).clamp(30, 64);
    let popup = centered_popup_rect(popup_width, 9, area);
    let block = popup_block("Rename template");
    let inner = block.inner(popup);

    let input_width = inner.width.saturating_sub(2);
    let (visible, caret_col) = input_view(menu.name(), input_width);

    let mut lines = vec![
        Line::styled("Name", Style::default().add_modifier(Modifier::BOLD)),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(visible, Style::default().add_modifier(Modifier::UNDERLINED)),
        ]),
        Line::raw(""),
    ];
    if surface.has_error() {
        lines.push(Line::styled(RENAME_FAILED, error_style()));
    } else {
        lines.push(Line::raw(""));
    }
    lines.push(Line::raw(""));
    if surface.is_loading() {
        lines.push(Line::styled("Saving...", Style::default().fg(Color::Cyan)));
    } else {
        lines.push(Line::styled("Enter: save · Esc: cancel", hint_style()));
    }

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);

    if surface.is_closeable() {
        frame.set_cursor_position(Position::new(inner.x + 2 + caret_col, inner.y + 1));
    }
}

fn render_delete_surface(menu: &ActionMenu, frame: &mut Frame, area: Rect) {
    let surface = menu.delete_surface();
    let popup_width = area.width.saturating_sub(8).clamp(30, 64);
    let popup = centered_popup_rect(popup_width, 9, area);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                format!("\"{}\"", menu.template().name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::raw(DELETE_WARNING),
        Line::raw(""),
    ];
    if surface.has_error() {
        lines.push(Line::styled(DELETE_FAILED, error_style()));
    } else {
        lines.push(Line::raw(""));
    }
    lines.push(Line::raw(""));
    if surface.is_loading() {
        lines.push(Line::styled("Deleting...", Style::default().fg(Color::Cyan)));
    } else {
        lines.push(Line::styled("y/Enter: delete · n/Esc: cancel", hint_style()));
    }

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(popup_block("Delete template")),
        popup,
    );
}

pub fn render_create_prompt(prompt: &FieldBuffer, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(8).clamp(30, 64);
    let popup = centered_popup_rect(popup_width, 6, area);
    let block = popup_block("New template");
    let inner = block.inner(popup);
    let (visible, caret_col) = input_view(prompt, inner.width.saturating_sub(2));

    let lines = vec![
        Line::from(vec![
            Span::raw("> "),
            Span::styled(visible, Style::default().add_modifier(Modifier::UNDERLINED)),
        ]),
        Line::raw(""),
        Line::styled("Enter: create · Esc: cancel", hint_style()),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
    frame.set_cursor_position(Position::new(inner.x + 2 + caret_col, inner.y));
}

pub fn render_snippet_picker(frame: &mut Frame, area: Rect) {
    #[allow(clippy::cast_possible_truncation)]
    let popup_height = SNIPPETS.len() as u16 + 4;
    let popup = centered_popup_rect(area.width.saturating_sub(16).max(44), popup_height, area);

    let mut lines: Vec<Line> = SNIPPETS
        .iter()
        .enumerate()
        .map(|(idx, snippet)| {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", idx + 1),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<18}", snippet.label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(snippet.body, Style::default().fg(Color::Cyan)),
            ])
        })
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("1-{} insert · any other key cancels", SNIPPETS.len()),
        hint_style(),
    ));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(popup_block("Insert snippet")),
        popup,
    );
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::styled("Templates", section_style),
        Line::raw("  j/k or Up/Down      Select"),
        Line::raw("  Enter / e           Edit"),
        Line::raw("  m / Space           Actions"),
        Line::raw("  r / d               Rename / delete"),
        Line::raw("  n                   New template"),
        Line::raw("  R / F5              Refresh"),
        Line::raw(""),
        Line::styled("Editor", section_style),
        Line::raw("  Tab / Shift-Tab     Next / previous field"),
        Line::raw("  Ctrl-t              Insert snippet"),
        Line::raw("  Ctrl-s              Save now"),
        Line::raw("  Esc                 Back to list"),
        Line::raw("  Ctrl+Left/Right     Word movement"),
        Line::raw(""),
        Line::styled("Other", section_style),
        Line::raw("  q / Ctrl-c / Ctrl-q Quit"),
        Line::raw("  ? / F1              Toggle help"),
        Line::raw(""),
        Line::styled("Config", section_style),
        Line::raw(format!("  API: {}", model.api_url)),
        Line::raw(format!("  Global: {global_cfg}")),
        Line::raw(format!("  Local override: {local_cfg}")),
    ];

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
