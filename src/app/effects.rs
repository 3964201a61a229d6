use crate::api::{ApiWorker, Completion};
use crate::app::{App, Message, Model, update};

use super::event_loop::Autosave;

impl App {
    /// Run one message through `update` together with the autosave
    /// bookkeeping around it.
    ///
    /// Leaving the editor, quitting and "save now" first flush the pending
    /// draft so it is saved right away instead of after the quiet period.
    pub(super) fn dispatch(model: &mut Model, msg: Message, now_ms: u64, autosave: &mut Autosave) {
        if matches!(msg, Message::ExitEditor | Message::Quit | Message::SaveNow)
            && let Some(draft) = autosave.debouncer.flush()
        {
            tracing::debug!(uuid = %draft.uuid, ?msg, "autosave.flush");
            *model = update(std::mem::take(model), Message::AutosaveFire(draft));
            if msg == Message::SaveNow {
                return;
            }
        }
        *model = update(std::mem::take(model), msg);
        autosave.observe(model, now_ms);
    }

    /// Hand queued calls to the worker. A worker that has gone away fails
    /// the call immediately.
    pub(super) fn submit_outbox(model: &mut Model, worker: &ApiWorker) {
        for (ticket, request) in model.take_outbox() {
            if let Err(err) = worker.submit(ticket, request) {
                tracing::error!(%err, ticket = ticket.0, "api.submit.failed");
                model.apply_completion(Completion {
                    ticket,
                    result: Err(err),
                });
            }
        }
    }
}
