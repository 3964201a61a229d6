// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. template::TemplateApi)
    clippy::module_name_repetitions
)]

//! # Mailwright
//!
//! A terminal editor for email templates stored behind a content API.
//!
//! Mailwright lists the templates on the server and lets you:
//! - Rename or delete a template behind a confirmation
//! - Edit subject, preview text and HTML body with autosave
//! - Insert merge-tag snippets into the body
//!
//! ## Architecture
//!
//! Mailwright uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! Network calls run on a background worker and come back to the event loop
//! as messages.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`api`]: Content API client and background worker
//! - [`editor`]: Template editor, field buffers and autosave debouncing
//! - [`menu`]: Rename and delete confirmations
//! - [`template`]: The template record and request bodies
//! - [`snippets`]: Merge-tag snippets
//! - [`ui`]: Terminal UI components
//! - [`config`]: rc-file defaults

pub mod api;
pub mod app;
pub mod config;
pub mod editor;
pub mod menu;
pub mod snippets;
pub mod template;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiError, HttpTemplateApi, TemplateApi};
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::{SaveDebouncer, SaveStatus, TemplateEditor};
    pub use crate::menu::ActionMenu;
    pub use crate::template::Template;
}
