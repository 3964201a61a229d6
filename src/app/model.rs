use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::api::{ApiReply, ApiRequest, Completion, Ticket};
use crate::editor::{FieldBuffer, SaveStatus, TemplateEditor};
use crate::menu::{ActionMenu, MenuAction, MenuOutcome};
use crate::template::{CreateTemplateRequest, Template};

const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    List,
    Edit,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state. Network calls are
/// never made from here; they are queued in the outbox and drained by the
/// event loop.
pub struct Model {
    /// Templates as last fetched from the server
    pub templates: Vec<Template>,
    /// Highlighted row in the template list
    pub selected: usize,
    /// A list fetch is in flight
    pub list_loading: bool,
    /// The last list fetch failed
    pub list_error: bool,
    /// Which screen is showing
    pub screen: Screen,
    /// The open editor, if any
    pub editor: Option<TemplateEditor>,
    /// The last save issued by the editor failed
    pub save_error: bool,
    /// Action menu for the highlighted template
    pub menu: Option<ActionMenu>,
    /// Name prompt for a new template
    pub create_prompt: Option<FieldBuffer>,
    /// Whether the snippet picker is showing
    pub snippet_picker: bool,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Base URL of the content API, shown in the status bar
    pub api_url: String,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Frame counter for the saving spinner
    pub spinner_frame: usize,
    /// Terminal size in cells
    pub terminal_size: (u16, u16),
    /// Whether the app should quit
    pub should_quit: bool,
    /// Set after first quit attempt with unsaved changes; allows second quit to proceed
    pub quit_confirmed: bool,
    toast: Option<Toast>,
    list_ticket: Option<Ticket>,
    fetch_ticket: Option<Ticket>,
    create_ticket: Option<Ticket>,
    /// Latest save in flight per template uuid
    save_tickets: HashMap<String, Ticket>,
    next_ticket: u64,
    outbox: Vec<(Ticket, ApiRequest)>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("screen", &self.screen)
            .field("templates", &self.templates.len())
            .field("selected", &self.selected)
            .field("saving", &self.is_saving())
            .field("save_error", &self.save_error)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a new model with default settings.
    pub fn new(api_url: impl Into<String>, terminal_size: (u16, u16)) -> Self {
        Self {
            api_url: api_url.into(),
            terminal_size,
            ..Self::default()
        }
    }

    // --- Outbox ---

    /// Allocate a ticket without queueing anything.
    pub(super) const fn next_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Queue a call for the event loop to submit.
    pub(super) fn issue(&mut self, request: ApiRequest) -> Ticket {
        let ticket = self.next_ticket();
        self.outbox.push((ticket, request));
        ticket
    }

    pub(super) fn queue_issued(&mut self, ticket: Ticket, request: ApiRequest) {
        self.outbox.push((ticket, request));
    }

    /// Calls queued since the last drain, in issue order.
    pub fn take_outbox(&mut self) -> Vec<(Ticket, ApiRequest)> {
        std::mem::take(&mut self.outbox)
    }

    // --- Queries ---

    pub fn selected_template(&self) -> Option<&Template> {
        self.templates.get(self.selected)
    }

    /// Any save is in flight.
    pub fn is_saving(&self) -> bool {
        !self.save_tickets.is_empty()
    }

    pub(super) fn is_saving_uuid(&self, uuid: &str) -> bool {
        self.save_tickets.contains_key(uuid)
    }

    pub const fn is_creating(&self) -> bool {
        self.create_ticket.is_some()
    }

    /// Save indicator for the open editor.
    pub fn save_status(&self) -> Option<SaveStatus> {
        self.editor
            .as_ref()
            .map(|editor| {
                editor.status(self.is_saving_uuid(&editor.template().uuid), self.save_error)
            })
    }

    /// Unsaved work that quitting would lose.
    pub fn has_unsaved_work(&self) -> bool {
        self.is_saving() || self.editor.as_ref().is_some_and(TemplateEditor::is_dirty)
    }

    // --- Commands ---

    pub(super) fn refresh_list(&mut self) {
        self.list_loading = true;
        self.list_ticket = Some(self.issue(ApiRequest::List));
    }

    pub(super) fn open_editor(&mut self, template: Template) {
        tracing::info!(uuid = %template.uuid, "editor.open");
        let uuid = template.uuid.clone();
        self.editor = Some(TemplateEditor::new(template));
        self.screen = Screen::Edit;
        self.save_error = false;
        self.snippet_picker = false;
        self.fetch_ticket = Some(self.issue(ApiRequest::Get { uuid }));
    }

    pub(super) fn close_editor(&mut self) {
        if let Some(editor) = self.editor.take() {
            tracing::info!(uuid = %editor.template().uuid, "editor.close");
        }
        self.screen = Screen::List;
        self.snippet_picker = false;
        self.fetch_ticket = None;
        self.save_error = false;
        // An in-flight save still lands in the list via its completion.
    }

    /// Start saving `draft`. A newer save supersedes any in flight.
    pub(super) fn begin_save(&mut self, draft: Template) {
        tracing::debug!(uuid = %draft.uuid, "editor.save.begin");
        self.save_error = false;
        let uuid = draft.uuid.clone();
        let ticket = self.issue(ApiRequest::Save(draft));
        self.save_tickets.insert(uuid, ticket);
    }

    pub(super) fn begin_create(&mut self, name: String) {
        tracing::info!(%name, "list.create.begin");
        let request = ApiRequest::Create(CreateTemplateRequest::named(name));
        self.create_ticket = Some(self.issue(request));
    }

    fn replace_in_list(&mut self, template: &Template) {
        if let Some(slot) = self.templates.iter_mut().find(|t| t.uuid == template.uuid) {
            *slot = template.clone();
        }
    }

    pub(super) fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.templates.len().saturating_sub(1));
    }

    // --- Completions ---

    /// Apply a finished call to whichever part of the state issued it.
    /// Completions nobody is waiting for are dropped.
    pub(super) fn apply_completion(&mut self, completion: Completion) {
        let Completion { ticket, result } = completion;

        if self.list_ticket == Some(ticket) {
            self.list_ticket = None;
            self.list_loading = false;
            match result {
                Ok(ApiReply::Listed(templates)) => {
                    self.templates = templates;
                    self.list_error = false;
                    self.clamp_selection();
                }
                Ok(other) => tracing::warn!(?other, "list.unexpected_reply"),
                Err(err) => {
                    tracing::warn!(%err, "list.failed");
                    self.list_error = true;
                    self.show_toast(ToastLevel::Error, "Failed to load templates");
                }
            }
            return;
        }

        if self.fetch_ticket == Some(ticket) {
            self.fetch_ticket = None;
            match result {
                Ok(ApiReply::Fetched(template)) => {
                    self.replace_in_list(&template);
                    if let Some(editor) = self.editor.as_mut()
                        && editor.template().uuid == template.uuid
                    {
                        if editor.revision() == 0 {
                            *editor = TemplateEditor::new(template);
                        } else {
                            editor.set_template(template);
                        }
                    }
                }
                Ok(other) => tracing::warn!(?other, "editor.fetch.unexpected_reply"),
                Err(err) => tracing::warn!(%err, "editor.fetch.failed"),
            }
            return;
        }

        if self.create_ticket == Some(ticket) {
            self.create_ticket = None;
            match result {
                Ok(ApiReply::Created(template)) => {
                    self.show_toast(ToastLevel::Info, format!("Created \"{}\"", template.name));
                    self.templates.push(template.clone());
                    // Only jump into the new template if nothing else is open.
                    if self.screen == Screen::List && self.editor.is_none() {
                        self.selected = self.templates.len() - 1;
                        self.open_editor(template);
                    }
                    self.refresh_list();
                }
                Ok(other) => tracing::warn!(?other, "list.create.unexpected_reply"),
                Err(err) => {
                    tracing::warn!(%err, "list.create.failed");
                    self.show_toast(ToastLevel::Error, "Failed to create the template");
                }
            }
            return;
        }

        let saved_uuid = self
            .save_tickets
            .iter()
            .find_map(|(uuid, t)| (*t == ticket).then(|| uuid.clone()));
        if let Some(uuid) = saved_uuid {
            self.save_tickets.remove(&uuid);
            let editing = self
                .editor
                .as_ref()
                .is_some_and(|editor| editor.template().uuid == uuid);
            match result {
                Ok(ApiReply::Saved(saved)) => {
                    tracing::debug!(uuid = %saved.uuid, "editor.save.ok");
                    self.replace_in_list(&saved);
                    if let Some(editor) = self.editor.as_mut()
                        && editor.template().uuid == saved.uuid
                    {
                        if editor.revision() == 0 {
                            *editor = TemplateEditor::new(saved);
                        } else {
                            editor.set_template(saved);
                        }
                    }
                }
                Ok(other) => tracing::warn!(?other, "editor.save.unexpected_reply"),
                Err(err) => {
                    tracing::warn!(%err, %uuid, "editor.save.failed");
                    if editing {
                        self.save_error = true;
                    } else {
                        self.show_toast(ToastLevel::Error, "Failed to save changes");
                    }
                }
            }
            return;
        }

        if let Some(menu) = self.menu.as_mut() {
            if let Err(err) = &result {
                tracing::warn!(%err, ticket = ticket.0, "menu.call.failed");
            }
            match menu.complete(ticket, result.is_ok()) {
                MenuOutcome::Updated(action) => {
                    tracing::info!(?action, "menu.updated");
                    if !menu.surface_open() && !menu.popover_open() {
                        self.menu = None;
                    }
                    let message = match action {
                        MenuAction::Delete => "Template deleted",
                        MenuAction::Rename | MenuAction::Edit => "Template renamed",
                    };
                    self.show_toast(ToastLevel::Info, message);
                    self.refresh_list();
                    return;
                }
                MenuOutcome::Failed(_) => return,
                MenuOutcome::Ignored => {}
            }
        }

        tracing::debug!(ticket = ticket.0, "api.completion.stale");
    }

    // --- Toasts ---

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            selected: 0,
            list_loading: false,
            list_error: false,
            screen: Screen::List,
            editor: None,
            save_error: false,
            menu: None,
            create_prompt: None,
            snippet_picker: false,
            help_visible: false,
            api_url: String::new(),
            config_global_path: None,
            config_local_path: None,
            spinner_frame: 0,
            terminal_size: (80, 24),
            should_quit: false,
            quit_confirmed: false,
            toast: None,
            list_ticket: None,
            fetch_ticket: None,
            create_ticket: None,
            save_tickets: HashMap::new(),
            next_ticket: 0,
            outbox: Vec::new(),
        }
    }
}
