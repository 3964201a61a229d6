use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use super::{ApiError, ApiRequest, Completion, TemplateApi, Ticket, execute};

/// Runs API calls on a background thread with its own tokio runtime.
///
/// Calls are started as soon as they are submitted and may complete in any
/// order, except saves, which run one at a time in submission order. Each
/// completion carries the ticket it was submitted with. The UI
/// thread polls [`ApiWorker::try_recv`] from its event loop.
pub struct ApiWorker {
    jobs: UnboundedSender<(Ticket, ApiRequest)>,
    completions: Receiver<Completion>,
    _thread: JoinHandle<()>,
}

impl ApiWorker {
    /// Start the worker thread.
    ///
    /// # Errors
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn(api: Arc<dyn TemplateApi>) -> std::io::Result<Self> {
        let (jobs_tx, mut jobs_rx) = unbounded_channel::<(Ticket, ApiRequest)>();
        let (done_tx, done_rx) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("api-worker".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(err) => {
                        tracing::error!(%err, "api.worker.runtime_failed");
                        return;
                    }
                };
                runtime.block_on(async move {
                    // Saves reach the server in the order they were issued.
                    let (saves_tx, mut saves_rx) = unbounded_channel::<(Ticket, ApiRequest)>();
                    let save_api = Arc::clone(&api);
                    let save_done = done_tx.clone();
                    tokio::spawn(async move {
                        while let Some((ticket, request)) = saves_rx.recv().await {
                            run_call(save_api.as_ref(), ticket, request, &save_done).await;
                        }
                    });

                    while let Some((ticket, request)) = jobs_rx.recv().await {
                        if matches!(request, ApiRequest::Save(_)) {
                            if saves_tx.send((ticket, request)).is_err() {
                                tracing::error!(ticket = ticket.0, "api.worker.save_queue_closed");
                            }
                            continue;
                        }
                        let api = Arc::clone(&api);
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            run_call(api.as_ref(), ticket, request, &done_tx).await;
                        });
                    }
                });
            })?;

        Ok(Self {
            jobs: jobs_tx,
            completions: done_rx,
            _thread: thread,
        })
    }

    /// Queue a call.
    ///
    /// # Errors
    /// Returns [`ApiError::Runtime`] if the worker thread has stopped.
    pub fn submit(&self, ticket: Ticket, request: ApiRequest) -> Result<(), ApiError> {
        tracing::debug!(ticket = ticket.0, kind = request.kind(), "api.submit");
        self.jobs
            .send((ticket, request))
            .map_err(|_| ApiError::Runtime("worker stopped".to_string()))
    }

    /// Next finished call, if any, without blocking.
    pub fn try_recv(&self) -> Option<Completion> {
        self.completions.try_recv().ok()
    }

    /// Wait up to `timeout` for the next finished call.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        self.completions.recv_timeout(timeout).ok()
    }
}

async fn run_call(
    api: &dyn TemplateApi,
    ticket: Ticket,
    request: ApiRequest,
    done: &mpsc::Sender<Completion>,
) {
    let kind = request.kind();
    let result = execute(api, request).await;
    match &result {
        Ok(_) => tracing::debug!(ticket = ticket.0, kind, "api.call.ok"),
        Err(err) => tracing::warn!(ticket = ticket.0, kind, %err, "api.call.failed"),
    }
    let _ = done.send(Completion { ticket, result });
}

impl std::fmt::Debug for ApiWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiWorker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiReply;
    use crate::template::{
        CreateTemplateRequest, RenameTemplateRequest, SaveTemplateRequest, Template,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        saved: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TemplateApi for FakeApi {
        async fn list(&self) -> Result<Vec<Template>, ApiError> {
            Ok(vec![Template::new("t-1", "One", "", None, "")])
        }

        async fn get(&self, uuid: &str) -> Result<Template, ApiError> {
            Ok(Template::new(uuid, "One", "", None, ""))
        }

        async fn create(&self, body: &CreateTemplateRequest) -> Result<Template, ApiError> {
            Ok(Template::new("new", body.name.clone(), "", None, ""))
        }

        async fn save(
            &self,
            _uuid: &str,
            body: &SaveTemplateRequest,
        ) -> Result<Option<Template>, ApiError> {
            // Older drafts are slower, so unordered saves would land last-first.
            if body.subject == "slow" {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.saved.lock().unwrap().push(body.subject.clone());
            Ok(None)
        }

        async fn rename(&self, _uuid: &str, _body: &RenameTemplateRequest) -> Result<(), ApiError> {
            Err(ApiError::Status(500))
        }

        async fn delete(&self, _uuid: &str) -> Result<(), ApiError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        }
    }

    fn worker() -> ApiWorker {
        ApiWorker::spawn(Arc::new(FakeApi::default())).expect("spawn worker")
    }

    #[test]
    fn test_completion_carries_ticket_and_reply() {
        let worker = worker();
        worker.submit(Ticket(7), ApiRequest::List).unwrap();
        let done = worker.recv_timeout(Duration::from_secs(5)).expect("completion");
        assert_eq!(done.ticket, Ticket(7));
        assert!(matches!(done.result, Ok(ApiReply::Listed(ref list)) if list.len() == 1));
    }

    #[test]
    fn test_save_without_body_echoes_draft() {
        let worker = worker();
        let draft = Template::new("t-1", "One", "Edited", None, "<p/>");
        worker.submit(Ticket(1), ApiRequest::Save(draft.clone())).unwrap();
        let done = worker.recv_timeout(Duration::from_secs(5)).expect("completion");
        assert_eq!(done.result, Ok(ApiReply::Saved(draft)));
    }

    #[test]
    fn test_failure_is_reported_not_panicked() {
        let worker = worker();
        let template = Template::new("t-1", "One", "", None, "");
        let request = ApiRequest::Rename {
            uuid: template.uuid.clone(),
            body: template.rename_request("Two"),
        };
        worker.submit(Ticket(3), request).unwrap();
        let done = worker.recv_timeout(Duration::from_secs(5)).expect("completion");
        assert_eq!(done.result, Err(ApiError::Status(500)));
    }

    #[test]
    fn test_calls_run_concurrently() {
        let worker = worker();
        worker
            .submit(Ticket(1), ApiRequest::Delete { uuid: "t-1".into() })
            .unwrap();
        worker.submit(Ticket(2), ApiRequest::List).unwrap();
        let first = worker.recv_timeout(Duration::from_secs(5)).expect("first");
        let second = worker.recv_timeout(Duration::from_secs(5)).expect("second");
        assert_eq!(first.ticket, Ticket(2));
        assert_eq!(second.ticket, Ticket(1));
    }

    #[test]
    fn test_saves_reach_the_server_in_issue_order() {
        let api = FakeApi::default();
        let saved = Arc::clone(&api.saved);
        let worker = ApiWorker::spawn(Arc::new(api)).expect("spawn worker");
        let first = Template::new("t-1", "One", "slow", None, "");
        let second = Template::new("t-1", "One", "fast", None, "");
        worker.submit(Ticket(1), ApiRequest::Save(first)).unwrap();
        worker.submit(Ticket(2), ApiRequest::Save(second)).unwrap();

        let a = worker.recv_timeout(Duration::from_secs(5)).expect("first");
        let b = worker.recv_timeout(Duration::from_secs(5)).expect("second");
        assert_eq!((a.ticket, b.ticket), (Ticket(1), Ticket(2)));
        assert_eq!(*saved.lock().unwrap(), vec!["slow", "fast"]);
    }
}
