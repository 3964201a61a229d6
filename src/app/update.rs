use crate::api::Completion;
use crate::app::model::Screen;
use crate::app::{Model, ToastLevel};
use crate::editor::{EditOp, Field, FieldBuffer, Motion};
use crate::menu::{ActionMenu, MenuAction};
use crate::snippets;
use crate::template::Template;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Template list
    /// Move list selection up
    ListUp,
    /// Move list selection down
    ListDown,
    /// Jump to first template
    ListTop,
    /// Jump to last template
    ListBottom,
    /// Refetch the template list
    Refresh,
    /// Open the highlighted template in the editor
    OpenSelected,

    // Action menu
    /// Show the action popover for the highlighted template
    OpenMenu,
    /// Move popover selection up
    MenuUp,
    /// Move popover selection down
    MenuDown,
    /// Run the highlighted popover action
    MenuChoose,
    /// Close the popover
    MenuClose,
    /// Open the rename surface for the highlighted template
    StartRename,
    /// Open the delete surface for the highlighted template
    StartDelete,
    /// Edit the name field in the rename surface
    RenameEdit(EditOp),
    /// Move the caret in the rename name field
    RenameMove(Motion),
    /// Confirm the rename surface
    ConfirmRename,
    /// Confirm the delete surface
    ConfirmDelete,
    /// Dismiss the open confirmation surface
    DismissSurface,

    // Create
    /// Show the new-template name prompt
    StartCreate,
    /// Edit the name in the create prompt
    CreateEdit(EditOp),
    /// Move the caret in the create prompt
    CreateMove(Motion),
    /// Submit the create prompt
    ConfirmCreate,
    /// Close the create prompt
    CancelCreate,

    // Editor
    /// Leave the editor and return to the list
    ExitEditor,
    /// Focus the next field
    FocusNext,
    /// Focus the previous field
    FocusPrev,
    /// Focus a specific field
    FocusField(Field),
    /// Apply an edit to the focused field
    Edit(EditOp),
    /// Insert pasted text into the focused field
    Paste(String),
    /// Move the caret in the focused field
    MoveCaret(Motion),
    /// Show the snippet picker
    OpenSnippetPicker,
    /// Hide the snippet picker
    CloseSnippetPicker,
    /// Insert snippet by 1-based number
    InsertSnippet(u8),
    /// Save the current draft right away
    SaveNow,
    /// The autosave quiet period elapsed for this draft
    AutosaveFire(Template),

    // Network
    /// A background call finished
    ApiCompleted(Completion),

    // Window
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Advance the saving spinner
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// No side effects should occur in this function; network calls are queued
/// on the model's outbox.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Reset confirmation flag on any action other than the confirmed one.
    // SaveNow preserves it so Ctrl+S can complete a pending quit.
    if !matches!(
        msg,
        Message::Quit
            | Message::SaveNow
            | Message::Tick
            | Message::ApiCompleted(_)
            | Message::AutosaveFire(_)
            | Message::Redraw
    ) {
        model.quit_confirmed = false;
    }

    match msg {
        // Template list
        Message::ListUp => {
            model.selected = model.selected.saturating_sub(1);
        }
        Message::ListDown => {
            let max = model.templates.len().saturating_sub(1);
            model.selected = (model.selected + 1).min(max);
        }
        Message::ListTop => model.selected = 0,
        Message::ListBottom => {
            model.selected = model.templates.len().saturating_sub(1);
        }
        Message::Refresh => {
            if !model.list_loading {
                model.refresh_list();
            }
        }
        Message::OpenSelected => {
            if let Some(template) = model.selected_template().cloned() {
                model.menu = None;
                model.open_editor(template);
            }
        }

        // Action menu
        Message::OpenMenu => {
            if let Some(template) = model.selected_template().cloned() {
                let mut menu = ActionMenu::new(template);
                menu.open_popover();
                model.menu = Some(menu);
            }
        }
        Message::MenuUp => {
            if let Some(menu) = model.menu.as_mut() {
                menu.popover_up();
            }
        }
        Message::MenuDown => {
            if let Some(menu) = model.menu.as_mut() {
                menu.popover_down();
            }
        }
        Message::MenuChoose => {
            let chosen = model.menu.as_mut().and_then(ActionMenu::choose);
            if chosen == Some(MenuAction::Edit) {
                model.menu = None;
                if let Some(template) = model.selected_template().cloned() {
                    model.open_editor(template);
                }
            }
        }
        Message::MenuClose => {
            if model.menu.as_ref().is_some_and(|menu| !menu.surface_open()) {
                model.menu = None;
            }
        }
        Message::StartRename => {
            if let Some(menu) = menu_for_selected(&mut model) {
                menu.open_rename();
            }
        }
        Message::StartDelete => {
            if let Some(menu) = menu_for_selected(&mut model) {
                menu.open_delete();
            }
        }
        Message::RenameEdit(op) => {
            if let Some(menu) = model.menu.as_mut()
                && menu.rename_surface().is_open()
                && menu.rename_surface().is_closeable()
            {
                apply_to_buffer(menu.name_mut(), op);
            }
        }
        Message::RenameMove(motion) => {
            if let Some(menu) = model.menu.as_mut() {
                move_in_buffer(menu.name_mut(), motion);
            }
        }
        Message::ConfirmRename => {
            let ticket = model.next_ticket();
            let request = model
                .menu
                .as_mut()
                .and_then(|menu| menu.submit_rename(ticket));
            if let Some(request) = request {
                model.queue_issued(ticket, request);
            }
        }
        Message::ConfirmDelete => {
            let ticket = model.next_ticket();
            let request = model
                .menu
                .as_mut()
                .and_then(|menu| menu.submit_delete(ticket));
            if let Some(request) = request {
                model.queue_issued(ticket, request);
            }
        }
        Message::DismissSurface => {
            if let Some(menu) = model.menu.as_mut()
                && menu.dismiss()
                && !menu.popover_open()
            {
                model.menu = None;
            }
        }

        // Create
        Message::StartCreate => {
            if !model.is_creating() {
                model.create_prompt = Some(FieldBuffer::single_line(""));
            }
        }
        Message::CreateEdit(op) => {
            if let Some(prompt) = model.create_prompt.as_mut() {
                apply_to_buffer(prompt, op);
            }
        }
        Message::CreateMove(motion) => {
            if let Some(prompt) = model.create_prompt.as_mut() {
                move_in_buffer(prompt, motion);
            }
        }
        Message::ConfirmCreate => {
            if let Some(prompt) = model.create_prompt.as_ref() {
                let name = prompt.text().trim().to_string();
                if name.is_empty() {
                    model.show_toast(ToastLevel::Warning, "Template name is required");
                } else {
                    model.create_prompt = None;
                    model.begin_create(name);
                }
            }
        }
        Message::CancelCreate => {
            model.create_prompt = None;
        }

        // Editor
        Message::ExitEditor => {
            if model.screen == Screen::Edit {
                // A dirty editor with nothing in flight still has work to keep.
                if let Some(draft) = model
                    .editor
                    .as_ref()
                    .filter(|editor| editor.is_dirty())
                    .filter(|editor| !model.is_saving_uuid(&editor.template().uuid))
                    .map(crate::editor::TemplateEditor::draft)
                {
                    model.begin_save(draft);
                }
                model.close_editor();
            }
        }
        Message::FocusNext => {
            if let Some(editor) = model.editor.as_mut() {
                editor.focus_next();
            }
        }
        Message::FocusPrev => {
            if let Some(editor) = model.editor.as_mut() {
                editor.focus_prev();
            }
        }
        Message::FocusField(field) => {
            if let Some(editor) = model.editor.as_mut() {
                editor.set_focus(field);
            }
        }
        Message::Edit(op) => {
            if let Some(editor) = model.editor.as_mut() {
                editor.apply(op);
            }
        }
        Message::Paste(text) => {
            if let Some(editor) = model.editor.as_mut() {
                editor.paste(&text);
            }
        }
        Message::MoveCaret(motion) => {
            if let Some(editor) = model.editor.as_mut() {
                editor.move_caret(motion);
            }
        }
        Message::OpenSnippetPicker => {
            if model.editor.is_some() {
                model.snippet_picker = true;
            }
        }
        Message::CloseSnippetPicker => {
            model.snippet_picker = false;
        }
        Message::InsertSnippet(number) => {
            model.snippet_picker = false;
            if let Some(editor) = model.editor.as_mut() {
                editor.insert_snippet(snippets::by_number(number));
            }
        }
        Message::SaveNow => {
            if let Some(draft) = model
                .editor
                .as_ref()
                .filter(|editor| editor.is_dirty())
                .map(crate::editor::TemplateEditor::draft)
            {
                model.begin_save(draft);
            }
        }
        Message::AutosaveFire(draft) => {
            // Drafts for a template that is no longer open still get saved;
            // leaving the editor flushes its pending draft through here.
            model.begin_save(draft);
        }

        // Network
        Message::ApiCompleted(completion) => {
            model.apply_completion(completion);
        }

        // Window
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::Tick => {
            model.spinner_frame = model.spinner_frame.wrapping_add(1);
        }
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
        }
        Message::Redraw => {}

        // Application
        Message::Quit => {
            if model.has_unsaved_work() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+Q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
    }
    model
}

/// The menu for the highlighted template, created if needed.
fn menu_for_selected(model: &mut Model) -> Option<&mut ActionMenu> {
    let template = model.selected_template()?.clone();
    let reuse = model
        .menu
        .as_ref()
        .is_some_and(|menu| menu.template().uuid == template.uuid);
    if !reuse {
        model.menu = Some(ActionMenu::new(template));
    }
    let menu = model.menu.as_mut()?;
    menu.close_popover();
    Some(menu)
}

fn apply_to_buffer(buf: &mut FieldBuffer, op: EditOp) {
    match op {
        EditOp::InsertChar(ch) => {
            buf.insert_char(ch);
        }
        EditOp::DeleteBack => {
            buf.delete_back();
        }
        EditOp::DeleteForward => {
            buf.delete_forward();
        }
        EditOp::SplitLine => {}
    }
}

fn move_in_buffer(buf: &mut FieldBuffer, motion: Motion) {
    match motion {
        Motion::Dir(dir) => buf.move_cursor(dir),
        Motion::LineStart | Motion::BufferStart => buf.move_to_start(),
        Motion::LineEnd | Motion::BufferEnd => buf.move_to_end(),
        Motion::WordLeft => buf.move_word_left(),
        Motion::WordRight => buf.move_word_right(),
    }
}
