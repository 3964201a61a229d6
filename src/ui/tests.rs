use super::*;
use crate::api::{ApiReply, Completion};
use crate::app::{Message, Model, update};
use crate::menu::{DELETE_FAILED, DELETE_WARNING, RENAME_FAILED};
use crate::template::Template;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 24);
    Terminal::new(backend).unwrap()
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw(model: &mut Model) -> String {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    screen_text(&terminal)
}

fn model_with_templates() -> Model {
    let mut model = Model::new("http://localhost:9712/api", (80, 24));
    model = update(model, Message::Refresh);
    let (ticket, _) = model.take_outbox().remove(0);
    update(
        model,
        Message::ApiCompleted(Completion {
            ticket,
            result: Ok(ApiReply::Listed(vec![
                Template::new("t-1", "Welcome", "Hello there", None, "<p>Hi</p>"),
                Template::new("t-2", "Newsletter", "Monthly news", None, ""),
            ])),
        }),
    )
}

/// Complete the most recent outstanding call with `result`.
fn complete_last(model: Model, result: Result<ApiReply, crate::api::ApiError>) -> Model {
    let mut model = model;
    let (ticket, _) = model.take_outbox().pop().expect("a queued call");
    update(model, Message::ApiCompleted(Completion { ticket, result }))
}

#[test]
fn test_list_shows_names_and_subjects() {
    let mut model = model_with_templates();
    let text = draw(&mut model);
    assert!(text.contains("Templates"));
    assert!(text.contains("> Welcome"));
    assert!(text.contains("Hello there"));
    assert!(text.contains("Newsletter"));
    assert!(text.contains("2 templates"));
}

#[test]
fn test_list_loading_and_empty_placeholders() {
    let mut model = update(Model::new("http://x", (80, 24)), Message::Refresh);
    assert!(draw(&mut model).contains("Loading templates..."));

    let mut model = complete_last(model, Ok(ApiReply::Listed(Vec::new())));
    assert!(draw(&mut model).contains("No templates yet"));
}

#[test]
fn test_list_error_placeholder() {
    let model = update(Model::new("http://x", (80, 24)), Message::Refresh);
    let mut model = complete_last(model, Err(crate::api::ApiError::Status(500)));
    let text = draw(&mut model);
    assert!(text.contains("Failed to load templates. Press R to retry."));
}

#[test]
fn test_editor_shows_fields_and_saved_status() {
    let model = model_with_templates();
    let mut model = update(model, Message::OpenSelected);
    let text = draw(&mut model);
    assert!(text.contains("Subject"));
    assert!(text.contains("Preview Text"));
    assert!(text.contains("HTML"));
    assert!(text.contains("<p>Hi</p>"));
    assert!(text.contains("All changes saved"));
}

#[test]
fn test_editor_shows_unsaved_then_spinner() {
    let model = model_with_templates();
    let model = update(model, Message::OpenSelected);
    let mut model = update(model, Message::Edit(crate::editor::EditOp::InsertChar('x')));
    assert!(draw(&mut model).contains("Unsaved changes"));

    let mut model = update(model, Message::SaveNow);
    let text = draw(&mut model);
    assert!(text.contains(SPINNER_FRAMES[0]));
    assert!(!text.contains("Unsaved changes"));
}

#[test]
fn test_editor_shows_failed_status() {
    let model = model_with_templates();
    let model = update(model, Message::OpenSelected);
    let model = update(model, Message::Edit(crate::editor::EditOp::InsertChar('x')));
    let model = update(model, Message::SaveNow);
    let mut model = complete_last(model, Err(crate::api::ApiError::Status(500)));
    assert!(draw(&mut model).contains("Failed to save changes"));
}

#[test]
fn test_empty_body_shows_placeholder() {
    let model = model_with_templates();
    let model = update(model, Message::ListDown);
    let mut model = update(model, Message::OpenSelected);
    let text = draw(&mut model);
    assert!(text.contains("Newsletter"));
    assert!(text.contains("Write your email HTML here"));
}

#[test]
fn test_rename_surface_shows_name_and_error() {
    let model = model_with_templates();
    let mut model = update(model, Message::StartRename);
    let text = draw(&mut model);
    assert!(text.contains("Rename template"));
    assert!(text.contains("Welcome"));
    assert!(!text.contains(RENAME_FAILED));

    let model = update(model, Message::ConfirmRename);
    let mut model = complete_last(model, Err(crate::api::ApiError::Status(500)));
    let text = draw(&mut model);
    assert!(text.contains(RENAME_FAILED));
}

#[test]
fn test_delete_surface_shows_warning_and_loading() {
    let model = model_with_templates();
    let mut model = update(model, Message::StartDelete);
    let text = draw(&mut model);
    assert!(text.contains("Delete template"));
    assert!(text.contains(DELETE_WARNING));

    let mut model = update(model, Message::ConfirmDelete);
    assert!(draw(&mut model).contains("Deleting..."));

    let mut model = complete_last(model, Err(crate::api::ApiError::Status(500)));
    assert!(draw(&mut model).contains(DELETE_FAILED));
}

#[test]
fn test_snippet_picker_lists_snippets() {
    let model = model_with_templates();
    let model = update(model, Message::OpenSelected);
    let mut model = update(model, Message::OpenSnippetPicker);
    let text = draw(&mut model);
    assert!(text.contains("Insert snippet"));
    assert!(text.contains("{{Name}}"));
    assert!(text.contains("First Name"));
}

#[test]
fn test_status_text_cycles_spinner() {
    use crate::editor::SaveStatus;
    assert_eq!(status_text(SaveStatus::Saving, 0), SPINNER_FRAMES[0]);
    assert_eq!(
        status_text(SaveStatus::Saving, SPINNER_FRAMES.len() + 1),
        SPINNER_FRAMES[1]
    );
    assert_eq!(status_text(SaveStatus::Saved, 3), "All changes saved");
}

#[test]
fn test_centered_popup_rect_clamps_to_area() {
    let area = ratatui::layout::Rect::new(0, 0, 20, 10);
    let rect = centered_popup_rect(40, 4, area);
    assert_eq!(rect.width, 20);
    assert_eq!(rect.height, 4);
    assert_eq!(rect.y, 3);
}
