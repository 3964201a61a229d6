use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::{Model, Screen};
use crate::editor::{Field, FieldBuffer};

use super::{overlays, status};

const SINGLE_LINE_FIELD_HEIGHT: u16 = 3;

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let show_caret = !has_overlay(model);
    match model.screen {
        Screen::List => render_list(model, frame, chunks[0]),
        Screen::Edit => render_editor(model, frame, chunks[0], show_caret),
    }

    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, chunks[1]);
    } else {
        status::render_status_bar(model, frame, chunks[1]);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else if let Some(menu) = model.menu.as_ref() {
        overlays::render_menu(menu, frame, area);
    } else if let Some(prompt) = model.create_prompt.as_ref() {
        overlays::render_create_prompt(prompt, frame, area);
    } else if model.snippet_picker {
        overlays::render_snippet_picker(frame, area);
    }
}

fn has_overlay(model: &Model) -> bool {
    model.help_visible
        || model.menu.is_some()
        || model.create_prompt.is_some()
        || model.snippet_picker
}

fn render_list(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default().title("Templates").borders(Borders::ALL);

    let placeholder = if model.templates.is_empty() {
        if model.list_loading {
            Some("Loading templates...")
        } else if model.list_error {
            Some("Failed to load templates. Press R to retry.")
        } else {
            Some("No templates yet. Press n to create one.")
        }
    } else {
        None
    };
    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(Line::styled(
            format!(" {text}"),
            Style::default().fg(Color::Indexed(245)),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = area.height.saturating_sub(2) as usize;
    let start = if visible_rows > 0 && model.selected >= visible_rows {
        model.selected + 1 - visible_rows
    } else {
        0
    };
    let name_width = model
        .templates
        .iter()
        .map(|t| t.name.width())
        .max()
        .unwrap_or(0)
        .min(40);

    let items: Vec<Line> = model
        .templates
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_rows)
        .map(|(i, template)| {
            let selected = i == model.selected;
            let marker = if selected { ">" } else { " " };
            let pad = name_width.saturating_sub(template.name.width());
            let line = Line::from(vec![
                Span::raw(format!("{marker} ")),
                Span::styled(
                    template.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" ".repeat(pad + 2)),
                Span::styled(
                    template.subject.clone(),
                    Style::default().fg(Color::Indexed(245)),
                ),
            ]);
            if selected {
                line.reversed()
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(items).block(block), area);
}

fn render_editor(model: &mut Model, frame: &mut Frame, area: Rect, show_caret: bool) {
    let save_status = model.save_status();
    let spinner_frame = model.spinner_frame;
    let Some(editor) = model.editor.as_mut() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(SINGLE_LINE_FIELD_HEIGHT),
            Constraint::Length(SINGLE_LINE_FIELD_HEIGHT),
            Constraint::Min(3),
        ])
        .split(area);

    let mut header = vec![Span::styled(
        format!(" {} ", editor.template().name),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(save_status) = save_status {
        header.push(Span::raw("  "));
        header.push(Span::styled(
            status::status_text(save_status, spinner_frame),
            status::status_style(save_status),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let focus = editor.focus();
    for (field, rect) in [
        (Field::Subject, chunks[1]),
        (Field::PreviewText, chunks[2]),
    ] {
        let caret = render_field(
            frame,
            rect,
            editor.field(field),
            field,
            field == focus,
            0,
        );
        if show_caret && field == focus {
            frame.set_cursor_position(caret);
        }
    }

    let body_height = chunks[3].height.saturating_sub(2) as usize;
    let scroll = editor.html_scroll_for(body_height);
    let caret = render_field(
        frame,
        chunks[3],
        editor.field(Field::HtmlBody),
        Field::HtmlBody,
        focus == Field::HtmlBody,
        scroll,
    );
    if show_caret && focus == Field::HtmlBody {
        frame.set_cursor_position(caret);
    }
}

/// Draw one bordered field starting at line `scroll` and return where the
/// caret lands on screen.
fn render_field(
    frame: &mut Frame,
    area: Rect,
    buf: &FieldBuffer,
    field: Field,
    focused: bool,
    scroll: usize,
) -> Position {
    let title = match field {
        Field::Subject => "Subject",
        Field::PreviewText => "Preview Text",
        Field::HtmlBody => "HTML",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });
    let inner = block.inner(area);

    let cursor = buf.cursor();
    let caret_line = buf.line_at(cursor.line).unwrap_or_default();
    let caret_col = caret_line
        .get(..cursor.col)
        .map_or(0, UnicodeWidthStr::width);
    let width = usize::from(inner.width.max(1));
    let h_offset = caret_col.saturating_sub(width - 1);

    let lines: Vec<Line> = if buf.is_empty() {
        vec![Line::styled(
            field.placeholder(),
            Style::default().fg(Color::Indexed(240)),
        )]
    } else {
        (scroll..buf.line_count())
            .take(usize::from(inner.height))
            .filter_map(|idx| buf.line_at(idx))
            .map(Line::raw)
            .collect()
    };
    let h_scroll = u16::try_from(h_offset).unwrap_or(u16::MAX);
    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((0, h_scroll)),
        area,
    );

    let x = u16::try_from(caret_col - h_offset).unwrap_or(0);
    let y = u16::try_from(cursor.line.saturating_sub(scroll)).unwrap_or(0);
    Position::new(
        inner.x + x.min(inner.width.saturating_sub(1)),
        inner.y + y.min(inner.height.saturating_sub(1)),
    )
}
