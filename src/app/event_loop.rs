use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::api::{ApiWorker, HttpTemplateApi, TemplateApi};
use crate::app::{App, Message, Model, update};
use crate::editor::SaveDebouncer;

/// Spinner frame interval while a save is in flight.
const SPINNER_INTERVAL_MS: u64 = 80;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Tracks the open editor so every local change queues its draft.
pub(super) struct Autosave {
    pub(super) debouncer: SaveDebouncer,
    seen: Option<(String, u64)>,
}

impl Autosave {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            debouncer: SaveDebouncer::new(delay_ms),
            seen: None,
        }
    }

    /// Compare the editor's revision with the last one seen and queue the
    /// current draft if it moved.
    pub(super) fn observe(&mut self, model: &Model, now_ms: u64) {
        let Some(editor) = model.editor.as_ref() else {
            self.debouncer.cancel();
            self.seen = None;
            return;
        };
        let uuid = &editor.template().uuid;
        let revision = editor.revision();
        match &self.seen {
            Some((seen_uuid, seen_revision)) if seen_uuid == uuid => {
                if *seen_revision != revision {
                    self.debouncer.queue(editor.draft(), now_ms);
                }
            }
            _ => self.debouncer.rebind(uuid),
        }
        self.seen = Some((uuid.clone(), revision));
    }
}

impl App {
    /// Run the main event loop against the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built, or if terminal
    /// initialization, the API worker or the event loop fails.
    pub fn run(&mut self) -> Result<()> {
        let api = HttpTemplateApi::new(&self.api_url, self.timeout)
            .context("Failed to build the HTTP client")?;
        let api: Arc<dyn TemplateApi> = Arc::new(api);
        self.run_with_api(api)
    }

    /// Run the main event loop against any [`TemplateApi`].
    ///
    /// # Errors
    ///
    /// See [`App::run`].
    pub fn run_with_api(&mut self, api: Arc<dyn TemplateApi>) -> Result<()> {
        tracing::info!(api_url = %self.api_url, autosave_ms = self.autosave_ms, "app.start");
        let worker = ApiWorker::spawn(api).context("Failed to start API worker")?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; mailwright requires an interactive terminal")?;
        let _ = execute!(stdout(), EnableBracketedPaste);
        let size = terminal.size()?;

        let mut model = Model::new(self.api_url.clone(), (size.width, size.height));
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        let result = self.event_loop(&mut terminal, &mut model, &worker);

        let _ = execute!(stdout(), DisableBracketedPaste);
        ratatui::restore();

        result
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        worker: &ApiWorker,
    ) -> Result<()> {
        let start = Instant::now();
        let elapsed_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut autosave = Autosave::new(self.autosave_ms);
        let mut last_tick_ms = 0_u64;
        let mut needs_render = true;

        *model = update(std::mem::take(model), Message::Refresh);

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = elapsed_ms();

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                Self::dispatch(model, Message::Resize(width, height), now_ms, &mut autosave);
                needs_render = true;
            }

            while let Some(completion) = worker.try_recv() {
                Self::dispatch(model, Message::ApiCompleted(completion), now_ms, &mut autosave);
                needs_render = true;
            }

            if let Some(draft) = autosave.debouncer.take_ready(now_ms) {
                tracing::debug!(uuid = %draft.uuid, "autosave.fire");
                Self::dispatch(model, Message::AutosaveFire(draft), now_ms, &mut autosave);
                needs_render = true;
            }

            if model.is_saving() && now_ms.saturating_sub(last_tick_ms) >= SPINNER_INTERVAL_MS {
                last_tick_ms = now_ms;
                Self::dispatch(model, Message::Tick, now_ms, &mut autosave);
                needs_render = true;
            }

            Self::submit_outbox(model, worker);

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() || autosave.debouncer.is_pending() {
                10
            } else {
                50
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = elapsed_ms();
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    tracing::trace!(?msg, "event.message");
                    Self::dispatch(model, msg, event_ms, &mut autosave);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms();
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        Self::dispatch(model, msg, drain_ms, &mut autosave);
                        needs_render = true;
                    }
                }
                Self::submit_outbox(model, worker);
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
