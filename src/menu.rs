//! Per-template action menu with rename and delete confirmations.
//!
//! Each confirmation surface is a small state machine:
//!
//! ```text
//! Closed -> Open -> Submitting -> Closed        (success)
//!                   Submitting -> Open{failed}  (failure)
//! ```
//!
//! While a surface is submitting its confirm action is blocked and it cannot
//! be dismissed. A submit is refused outright while any request from this
//! menu is still in flight.

use crate::api::{ApiRequest, Ticket};
use crate::editor::FieldBuffer;
use crate::template::Template;

pub const RENAME_FAILED: &str = "Failed to save changes. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete the template. Please try again.";
pub const DELETE_WARNING: &str = "Are you sure? You cannot undo this action.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Edit,
    Rename,
    Delete,
}

impl MenuAction {
    pub const ALL: [Self; 3] = [Self::Edit, Self::Rename, Self::Delete];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Rename => "Rename",
            Self::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Closed,
    Open { failed: bool },
    Submitting(Ticket),
}

/// A modal confirmation gating one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmSurface {
    state: SurfaceState,
}

impl ConfirmSurface {
    pub const fn new() -> Self {
        Self {
            state: SurfaceState::Closed,
        }
    }

    pub const fn state(&self) -> SurfaceState {
        self.state
    }

    pub const fn is_open(&self) -> bool {
        !matches!(self.state, SurfaceState::Closed)
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.state, SurfaceState::Submitting(_))
    }

    pub const fn is_closeable(&self) -> bool {
        !self.is_loading()
    }

    pub const fn has_error(&self) -> bool {
        matches!(self.state, SurfaceState::Open { failed: true })
    }

    /// Open the surface. An already open surface keeps its state.
    pub const fn open(&mut self) {
        if matches!(self.state, SurfaceState::Closed) {
            self.state = SurfaceState::Open { failed: false };
        }
    }

    /// Close the surface unless a request is in flight.
    pub const fn dismiss(&mut self) -> bool {
        if self.is_closeable() {
            self.state = SurfaceState::Closed;
            true
        } else {
            false
        }
    }

    const fn begin(&mut self, ticket: Ticket) -> bool {
        if matches!(self.state, SurfaceState::Open { .. }) {
            self.state = SurfaceState::Submitting(ticket);
            true
        } else {
            false
        }
    }

    /// Apply the result of the call issued under `ticket`. Returns `None`
    /// when this surface is not waiting for that ticket.
    const fn finish(&mut self, ticket: Ticket, ok: bool) -> Option<bool> {
        match self.state {
            SurfaceState::Submitting(pending) if pending.0 == ticket.0 => {
                self.state = if ok {
                    SurfaceState::Closed
                } else {
                    SurfaceState::Open { failed: true }
                };
                Some(ok)
            }
            _ => None,
        }
    }
}

impl Default for ConfirmSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// What the owner should do after a completion reached the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// The mutation succeeded; the owner should refetch.
    Updated(MenuAction),
    /// The mutation failed; the surface stays open with its error shown.
    Failed(MenuAction),
    /// The completion did not belong to this menu.
    Ignored,
}

#[derive(Debug)]
pub struct ActionMenu {
    template: Template,
    popover_selected: Option<usize>,
    name: FieldBuffer,
    rename: ConfirmSurface,
    delete: ConfirmSurface,
}

impl ActionMenu {
    pub fn new(template: Template) -> Self {
        let name = FieldBuffer::single_line(&template.name);
        Self {
            template,
            popover_selected: None,
            name,
            rename: ConfirmSurface::new(),
            delete: ConfirmSurface::new(),
        }
    }

    pub const fn template(&self) -> &Template {
        &self.template
    }

    pub const fn rename_surface(&self) -> &ConfirmSurface {
        &self.rename
    }

    pub const fn delete_surface(&self) -> &ConfirmSurface {
        &self.delete
    }

    pub const fn name(&self) -> &FieldBuffer {
        &self.name
    }

    pub const fn name_mut(&mut self) -> &mut FieldBuffer {
        &mut self.name
    }

    // --- Popover ---

    pub const fn popover_selected(&self) -> Option<usize> {
        self.popover_selected
    }

    pub const fn popover_open(&self) -> bool {
        self.popover_selected.is_some()
    }

    pub const fn open_popover(&mut self) {
        self.popover_selected = Some(0);
    }

    pub const fn close_popover(&mut self) {
        self.popover_selected = None;
    }

    pub const fn popover_up(&mut self) {
        if let Some(sel) = self.popover_selected {
            self.popover_selected = Some(sel.saturating_sub(1));
        }
    }

    pub const fn popover_down(&mut self) {
        if let Some(sel) = self.popover_selected
            && sel + 1 < MenuAction::ALL.len()
        {
            self.popover_selected = Some(sel + 1);
        }
    }

    /// Close the popover and return the highlighted action. Rename and
    /// Delete open their surfaces; Edit is left to the owner.
    pub fn choose(&mut self) -> Option<MenuAction> {
        let action = MenuAction::ALL.get(self.popover_selected?).copied()?;
        self.popover_selected = None;
        match action {
            MenuAction::Edit => {}
            MenuAction::Rename => self.open_rename(),
            MenuAction::Delete => self.open_delete(),
        }
        Some(action)
    }

    // --- Surfaces ---

    /// Whether a confirmation surface is showing.
    pub const fn surface_open(&self) -> bool {
        self.rename.is_open() || self.delete.is_open()
    }

    pub const fn in_flight(&self) -> bool {
        self.rename.is_loading() || self.delete.is_loading()
    }

    /// Open the rename surface with the name field set to the current name.
    pub fn open_rename(&mut self) {
        if !self.rename.is_open() {
            self.name = FieldBuffer::single_line(&self.template.name);
        }
        self.rename.open();
    }

    pub const fn open_delete(&mut self) {
        self.delete.open();
    }

    /// Dismiss whichever surface is open. Refused while submitting.
    pub const fn dismiss(&mut self) -> bool {
        if self.rename.is_open() {
            self.rename.dismiss()
        } else if self.delete.is_open() {
            self.delete.dismiss()
        } else {
            false
        }
    }

    /// The rename call to issue, or `None` if the surface is not open or a
    /// request is already in flight.
    pub fn submit_rename(&mut self, ticket: Ticket) -> Option<ApiRequest> {
        if self.in_flight() || !self.rename.begin(ticket) {
            return None;
        }
        let name = self.name.text();
        tracing::info!(uuid = %self.template.uuid, %name, "menu.rename.submit");
        Some(ApiRequest::Rename {
            uuid: self.template.uuid.clone(),
            body: self.template.rename_request(&name),
        })
    }

    /// The delete call to issue, or `None` if the surface is not open or a
    /// request is already in flight.
    pub fn submit_delete(&mut self, ticket: Ticket) -> Option<ApiRequest> {
        if self.in_flight() || !self.delete.begin(ticket) {
            return None;
        }
        tracing::info!(uuid = %self.template.uuid, "menu.delete.submit");
        Some(ApiRequest::Delete {
            uuid: self.template.uuid.clone(),
        })
    }

    /// Route a completion to the surface that issued it.
    pub const fn complete(&mut self, ticket: Ticket, ok: bool) -> MenuOutcome {
        if let Some(ok) = self.rename.finish(ticket, ok) {
            return if ok {
                MenuOutcome::Updated(MenuAction::Rename)
            } else {
                MenuOutcome::Failed(MenuAction::Rename)
            };
        }
        if let Some(ok) = self.delete.finish(ticket, ok) {
            return if ok {
                MenuOutcome::Updated(MenuAction::Delete)
            } else {
                MenuOutcome::Failed(MenuAction::Delete)
            };
        }
        MenuOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> ActionMenu {
        ActionMenu::new(Template::new("t-1", "Welcome", "Hi", None, "<p>x</p>"))
    }

    #[test]
    fn test_open_rename_prefills_current_name() {
        let mut menu = menu();
        menu.open_rename();
        assert!(menu.rename_surface().is_open());
        assert_eq!(menu.name().text(), "Welcome");
    }

    #[test]
    fn test_reopening_rename_resets_name() {
        let mut menu = menu();
        menu.open_rename();
        menu.name_mut().insert_str(" v2");
        assert!(menu.dismiss());
        menu.open_rename();
        assert_eq!(menu.name().text(), "Welcome");
    }

    #[test]
    fn test_submit_rename_sends_name_with_unchanged_fields() {
        let mut menu = menu();
        menu.open_rename();
        menu.name_mut().insert_str("!");
        let request = menu.submit_rename(Ticket(1)).expect("request");
        let ApiRequest::Rename { uuid, body } = request else {
            panic!("expected rename request");
        };
        assert_eq!(uuid, "t-1");
        assert_eq!(body.name, "Welcome!");
        assert_eq!(body.subject, "Hi");
        assert_eq!(body.html_body, "<p>x</p>");
        assert!(menu.rename_surface().is_loading());
        assert!(!menu.rename_surface().is_closeable());
    }

    #[test]
    fn test_rename_success_closes_and_reports_update_once() {
        let mut menu = menu();
        menu.open_rename();
        menu.submit_rename(Ticket(1)).unwrap();
        assert_eq!(
            menu.complete(Ticket(1), true),
            MenuOutcome::Updated(MenuAction::Rename)
        );
        assert!(!menu.rename_surface().is_open());
        assert_eq!(menu.complete(Ticket(1), true), MenuOutcome::Ignored);
    }

    #[test]
    fn test_rename_failure_keeps_surface_open_with_error() {
        let mut menu = menu();
        menu.open_rename();
        menu.name_mut().insert_str("!");
        menu.submit_rename(Ticket(1)).unwrap();
        assert_eq!(
            menu.complete(Ticket(1), false),
            MenuOutcome::Failed(MenuAction::Rename)
        );
        assert!(menu.rename_surface().is_open());
        assert!(menu.rename_surface().has_error());
        assert_eq!(menu.name().text(), "Welcome!");
        assert!(menu.submit_rename(Ticket(2)).is_some());
    }

    #[test]
    fn test_cannot_dismiss_while_submitting() {
        let mut menu = menu();
        menu.open_delete();
        menu.submit_delete(Ticket(5)).unwrap();
        assert!(!menu.dismiss());
        assert!(menu.delete_surface().is_open());
    }

    #[test]
    fn test_double_submit_is_deduplicated() {
        let mut menu = menu();
        menu.open_delete();
        assert!(menu.submit_delete(Ticket(1)).is_some());
        assert!(menu.submit_delete(Ticket(2)).is_none());
        menu.open_rename();
        assert!(menu.submit_rename(Ticket(3)).is_none());
    }

    #[test]
    fn test_submit_without_open_surface_is_refused() {
        let mut menu = menu();
        assert!(menu.submit_delete(Ticket(1)).is_none());
        assert!(menu.submit_rename(Ticket(1)).is_none());
    }

    #[test]
    fn test_delete_failure_then_retry_succeeds() {
        let mut menu = menu();
        menu.open_delete();
        menu.submit_delete(Ticket(1)).unwrap();
        assert_eq!(
            menu.complete(Ticket(1), false),
            MenuOutcome::Failed(MenuAction::Delete)
        );
        assert!(menu.delete_surface().has_error());
        menu.submit_delete(Ticket(2)).unwrap();
        assert_eq!(
            menu.complete(Ticket(2), true),
            MenuOutcome::Updated(MenuAction::Delete)
        );
        assert!(!menu.delete_surface().is_open());
    }

    #[test]
    fn test_popover_choose_opens_surface() {
        let mut menu = menu();
        menu.open_popover();
        menu.popover_down();
        assert_eq!(menu.choose(), Some(MenuAction::Rename));
        assert!(!menu.popover_open());
        assert!(menu.rename_surface().is_open());

        let mut menu = self::menu();
        menu.open_popover();
        assert_eq!(menu.choose(), Some(MenuAction::Edit));
        assert!(!menu.surface_open());
    }

    #[test]
    fn test_popover_selection_is_clamped() {
        let mut menu = menu();
        menu.open_popover();
        for _ in 0..10 {
            menu.popover_down();
        }
        assert_eq!(menu.popover_selected(), Some(2));
        menu.popover_up();
        menu.popover_up();
        menu.popover_up();
        assert_eq!(menu.popover_selected(), Some(0));
    }
}
