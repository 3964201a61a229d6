//! Live editing of a single template.
//!
//! The editor keeps its own copy of the subject, preview text and HTML body.
//! Dirtiness is always measured against the template most recently supplied
//! by the owner via [`TemplateEditor::new`] or [`TemplateEditor::set_template`],
//! never against the last successful save.

pub mod autosave;
mod buffer;

pub use autosave::{DEFAULT_AUTOSAVE_DELAY_MS, SaveDebouncer};
pub use buffer::{Cursor, Direction, FieldBuffer};

use crate::snippets::Snippet;
use crate::template::{Template, normalize_preview_text};

/// The editable fields, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Subject,
    PreviewText,
    HtmlBody,
}

impl Field {
    pub const fn next(self) -> Self {
        match self {
            Self::Subject => Self::PreviewText,
            Self::PreviewText => Self::HtmlBody,
            Self::HtmlBody => Self::Subject,
        }
    }

    pub const fn prev(self) -> Self {
        match self {
            Self::Subject => Self::HtmlBody,
            Self::PreviewText => Self::Subject,
            Self::HtmlBody => Self::PreviewText,
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::PreviewText => "Preview Text",
            Self::HtmlBody => "Write your email HTML here",
        }
    }
}

/// What the save indicator shows. Variants are listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saving,
    Failed,
    Unsaved,
    Saved,
}

impl SaveStatus {
    pub const fn resolve(saving: bool, save_error: bool, dirty: bool) -> Self {
        if saving {
            Self::Saving
        } else if save_error {
            Self::Failed
        } else if dirty {
            Self::Unsaved
        } else {
            Self::Saved
        }
    }

    /// Text label. `Saving` is drawn as a spinner and has no text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Saving => "",
            Self::Failed => "Failed to save changes",
            Self::Unsaved => "Unsaved changes",
            Self::Saved => "All changes saved",
        }
    }
}

/// A text edit applied to the focused field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    InsertChar(char),
    DeleteBack,
    DeleteForward,
    SplitLine,
}

/// Caret motion within the focused field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Dir(Direction),
    LineStart,
    LineEnd,
    WordLeft,
    WordRight,
    BufferStart,
    BufferEnd,
}

pub struct TemplateEditor {
    template: Template,
    subject: FieldBuffer,
    preview_text: FieldBuffer,
    html_body: FieldBuffer,
    focus: Field,
    revision: u64,
    html_scroll_offset: usize,
}

impl TemplateEditor {
    pub fn new(template: Template) -> Self {
        let subject = FieldBuffer::single_line(&template.subject);
        let preview_text =
            FieldBuffer::single_line(template.preview_text.as_deref().unwrap_or_default());
        let html_body = FieldBuffer::multi_line(&template.html_body);
        Self {
            template,
            subject,
            preview_text,
            html_body,
            focus: Field::HtmlBody,
            revision: 0,
            html_scroll_offset: 0,
        }
    }

    /// The template the editor was given by its owner.
    pub const fn template(&self) -> &Template {
        &self.template
    }

    /// Re-supply the template, e.g. after the owner refetched or saved it.
    /// Local field values are left alone.
    pub fn set_template(&mut self, template: Template) {
        self.template = template;
    }

    pub const fn focus(&self) -> Field {
        self.focus
    }

    pub const fn set_focus(&mut self, field: Field) {
        self.focus = field;
    }

    pub const fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub const fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub const fn field(&self, field: Field) -> &FieldBuffer {
        match field {
            Field::Subject => &self.subject,
            Field::PreviewText => &self.preview_text,
            Field::HtmlBody => &self.html_body,
        }
    }

    const fn field_mut(&mut self, field: Field) -> &mut FieldBuffer {
        match field {
            Field::Subject => &mut self.subject,
            Field::PreviewText => &mut self.preview_text,
            Field::HtmlBody => &mut self.html_body,
        }
    }

    /// Bumped on every change to a local field value.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.template.subject != self.subject.text()
            || normalize_preview_text(self.template.preview_text.as_deref())
                != normalize_preview_text(Some(&self.preview_text.text()))
            || self.template.html_body != self.html_body.text()
    }

    pub fn status(&self, saving: bool, save_error: bool) -> SaveStatus {
        SaveStatus::resolve(saving, save_error, self.is_dirty())
    }

    /// The supplied template with all local field values merged over it.
    pub fn draft(&self) -> Template {
        Template {
            subject: self.subject.text(),
            preview_text: normalize_preview_text(Some(&self.preview_text.text())),
            html_body: self.html_body.text(),
            ..self.template.clone()
        }
    }

    /// Apply an edit to the focused field. Returns whether the text changed.
    pub fn apply(&mut self, op: EditOp) -> bool {
        let buf = self.field_mut(self.focus);
        let changed = match op {
            EditOp::InsertChar(ch) => buf.insert_char(ch),
            EditOp::DeleteBack => buf.delete_back(),
            EditOp::DeleteForward => buf.delete_forward(),
            EditOp::SplitLine => buf.split_line(),
        };
        self.note_change(changed)
    }

    /// Insert pasted text into the focused field.
    pub fn paste(&mut self, text: &str) -> bool {
        let changed = self.field_mut(self.focus).insert_str(text);
        self.note_change(changed)
    }

    pub fn move_caret(&mut self, motion: Motion) {
        let buf = self.field_mut(self.focus);
        match motion {
            Motion::Dir(dir) => buf.move_cursor(dir),
            Motion::LineStart => buf.move_home(),
            Motion::LineEnd => buf.move_end(),
            Motion::WordLeft => buf.move_word_left(),
            Motion::WordRight => buf.move_word_right(),
            Motion::BufferStart => buf.move_to_start(),
            Motion::BufferEnd => buf.move_to_end(),
        }
    }

    /// Splice a snippet into the HTML body at its caret and focus the body.
    /// No snippet means nothing happens.
    pub fn insert_snippet(&mut self, snippet: Option<&Snippet>) -> bool {
        let Some(snippet) = snippet else {
            return false;
        };
        let changed = self.html_body.insert_str(snippet.body);
        self.focus = Field::HtmlBody;
        self.note_change(changed)
    }

    /// Replace the whole value of a field.
    pub fn replace(&mut self, field: Field, text: &str) -> bool {
        if self.field(field).text() == text {
            return false;
        }
        let fresh = if field == Field::HtmlBody {
            FieldBuffer::multi_line(text)
        } else {
            FieldBuffer::single_line(text)
        };
        *self.field_mut(field) = fresh;
        self.note_change(true)
    }

    /// First visible body line for a viewport of `height` rows, scrolled so
    /// the caret stays on screen.
    pub fn html_scroll_for(&mut self, height: usize) -> usize {
        let line = self.html_body.cursor().line;
        if line < self.html_scroll_offset {
            self.html_scroll_offset = line;
        } else if height > 0 && line >= self.html_scroll_offset + height {
            self.html_scroll_offset = line + 1 - height;
        }
        self.html_scroll_offset
    }

    const fn note_change(&mut self, changed: bool) -> bool {
        if changed {
            self.revision += 1;
        }
        changed
    }
}

impl std::fmt::Debug for TemplateEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEditor")
            .field("uuid", &self.template.uuid)
            .field("focus", &self.focus)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
