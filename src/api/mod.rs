//! Access to the content API.
//!
//! [`TemplateApi`] is the seam between the UI and the network. The
//! [`HttpTemplateApi`] implementation talks to the real server; the
//! [`ApiWorker`] runs calls off the UI thread and hands completions back to the
//! event loop tagged with the [`Ticket`] they were issued under.

mod http;
mod worker;

pub use http::HttpTemplateApi;
pub use worker::ApiWorker;

use async_trait::async_trait;

use crate::template::{
    CreateTemplateRequest, RenameTemplateRequest, SaveTemplateRequest, Template,
};

/// Why an API call failed. The UI collapses all of these into one
/// "failed" state; the detail only reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("api worker unavailable: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait TemplateApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Template>, ApiError>;
    async fn get(&self, uuid: &str) -> Result<Template, ApiError>;
    async fn create(&self, body: &CreateTemplateRequest) -> Result<Template, ApiError>;
    /// Full update. Returns the stored template, or `None` when the server
    /// acknowledged without a body.
    async fn save(&self, uuid: &str, body: &SaveTemplateRequest)
    -> Result<Option<Template>, ApiError>;
    async fn rename(&self, uuid: &str, body: &RenameTemplateRequest) -> Result<(), ApiError>;
    async fn delete(&self, uuid: &str) -> Result<(), ApiError>;
}

/// Identifies one issued call so its completion can be matched to the
/// component that is still waiting for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    List,
    Get { uuid: String },
    Create(CreateTemplateRequest),
    Save(Template),
    Rename {
        uuid: String,
        body: RenameTemplateRequest,
    },
    Delete { uuid: String },
}

impl ApiRequest {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get { .. } => "get",
            Self::Create(_) => "create",
            Self::Save(_) => "save",
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    Listed(Vec<Template>),
    Fetched(Template),
    Created(Template),
    Saved(Template),
    Renamed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<ApiReply, ApiError>,
}

/// Run one request against an API implementation.
pub async fn execute(api: &dyn TemplateApi, request: ApiRequest) -> Result<ApiReply, ApiError> {
    match request {
        ApiRequest::List => api.list().await.map(ApiReply::Listed),
        ApiRequest::Get { uuid } => api.get(&uuid).await.map(ApiReply::Fetched),
        ApiRequest::Create(body) => api.create(&body).await.map(ApiReply::Created),
        ApiRequest::Save(draft) => {
            let stored = api.save(&draft.uuid, &draft.save_request()).await?;
            Ok(ApiReply::Saved(stored.unwrap_or(draft)))
        }
        ApiRequest::Rename { uuid, body } => {
            api.rename(&uuid, &body).await.map(|()| ApiReply::Renamed)
        }
        ApiRequest::Delete { uuid } => api.delete(&uuid).await.map(|()| ApiReply::Deleted),
    }
}
