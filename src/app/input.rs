use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::model::Screen;
use crate::app::{App, Message, Model};
use crate::editor::{Direction, EditOp, Motion};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Paste(text) if model.screen == Screen::Edit && !has_overlay(model) => {
                Some(Message::Paste(text.replace("\r\n", "\n")))
            }
            Event::Resize(width, height) => {
                tracing::trace!(width, height, "event.resize.queue");
                resize_debouncer.queue(*width, *height, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c' | 'q')) {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if let Some(menu) = model.menu.as_ref() {
            if menu.rename_surface().is_open() {
                return match key.code {
                    KeyCode::Esc => Some(Message::DismissSurface),
                    KeyCode::Enter => Some(Message::ConfirmRename),
                    _ => text_field_key(key).map(|input| match input {
                        FieldInput::Edit(op) => Message::RenameEdit(op),
                        FieldInput::Move(motion) => Message::RenameMove(motion),
                    }),
                };
            }
            if menu.delete_surface().is_open() {
                return match key.code {
                    KeyCode::Esc | KeyCode::Char('n') => Some(Message::DismissSurface),
                    KeyCode::Enter | KeyCode::Char('y') => Some(Message::ConfirmDelete),
                    _ => None,
                };
            }
            if menu.popover_open() {
                return match key.code {
                    KeyCode::Char('k') | KeyCode::Up => Some(Message::MenuUp),
                    KeyCode::Char('j') | KeyCode::Down => Some(Message::MenuDown),
                    KeyCode::Enter | KeyCode::Char(' ') => Some(Message::MenuChoose),
                    KeyCode::Char('e') => Some(Message::OpenSelected),
                    KeyCode::Char('r') => Some(Message::StartRename),
                    KeyCode::Char('d') => Some(Message::StartDelete),
                    KeyCode::Esc | KeyCode::Char('q' | 'm') => Some(Message::MenuClose),
                    _ => None,
                };
            }
        }

        if model.create_prompt.is_some() {
            return match key.code {
                KeyCode::Esc => Some(Message::CancelCreate),
                KeyCode::Enter => Some(Message::ConfirmCreate),
                _ => text_field_key(key).map(|input| match input {
                    FieldInput::Edit(op) => Message::CreateEdit(op),
                    FieldInput::Move(motion) => Message::CreateMove(motion),
                }),
            };
        }

        if model.snippet_picker {
            return match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                    Some(Message::InsertSnippet((c as u8) - b'0'))
                }
                _ => Some(Message::CloseSnippetPicker),
            };
        }

        match model.screen {
            Screen::Edit => Self::handle_editor_key(key),
            Screen::List => Self::handle_list_key(key),
        }
    }

    fn handle_editor_key(key: KeyEvent) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Some(Message::ExitEditor),
            KeyCode::Char('s') if ctrl => Some(Message::SaveNow),
            KeyCode::Char('t') if ctrl => Some(Message::OpenSnippetPicker),
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Tab => Some(Message::FocusNext),
            KeyCode::BackTab => Some(Message::FocusPrev),
            KeyCode::Enter => Some(Message::Edit(EditOp::SplitLine)),
            _ => text_field_key(key).map(|input| match input {
                FieldInput::Edit(op) => Message::Edit(op),
                FieldInput::Move(motion) => Message::MoveCaret(motion),
            }),
        }
    }

    fn handle_list_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Message::ListDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::ListUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::ListTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::ListBottom),
            KeyCode::Enter | KeyCode::Char('e') => Some(Message::OpenSelected),
            KeyCode::Char('m' | ' ') => Some(Message::OpenMenu),
            KeyCode::Char('r') => Some(Message::StartRename),
            KeyCode::Char('d') => Some(Message::StartDelete),
            KeyCode::Char('n') => Some(Message::StartCreate),
            KeyCode::Char('R') | KeyCode::F(5) => Some(Message::Refresh),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        }
    }
}

enum FieldInput {
    Edit(EditOp),
    Move(Motion),
}

/// Keys shared by every text field: typing, deletion and caret motion.
fn text_field_key(key: KeyEvent) -> Option<FieldInput> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let input = match key.code {
        KeyCode::Char(c) if !ctrl && !alt => FieldInput::Edit(EditOp::InsertChar(c)),
        KeyCode::Backspace => FieldInput::Edit(EditOp::DeleteBack),
        KeyCode::Delete => FieldInput::Edit(EditOp::DeleteForward),
        KeyCode::Left if ctrl => FieldInput::Move(Motion::WordLeft),
        KeyCode::Right if ctrl => FieldInput::Move(Motion::WordRight),
        KeyCode::Home if ctrl => FieldInput::Move(Motion::BufferStart),
        KeyCode::End if ctrl => FieldInput::Move(Motion::BufferEnd),
        KeyCode::Left => FieldInput::Move(Motion::Dir(Direction::Left)),
        KeyCode::Right => FieldInput::Move(Motion::Dir(Direction::Right)),
        KeyCode::Up => FieldInput::Move(Motion::Dir(Direction::Up)),
        KeyCode::Down => FieldInput::Move(Motion::Dir(Direction::Down)),
        KeyCode::Home => FieldInput::Move(Motion::LineStart),
        KeyCode::End => FieldInput::Move(Motion::LineEnd),
        _ => return None,
    };
    Some(input)
}

fn has_overlay(model: &Model) -> bool {
    model.help_visible || model.snippet_picker || model.create_prompt.is_some()
}
