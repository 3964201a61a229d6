use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{ApiError, TemplateApi};
use crate::template::{
    CreateTemplateRequest, RenameTemplateRequest, SaveTemplateRequest, Template,
};

const TEMPLATES_PATH: &str = "/content/templates";

/// [`TemplateApi`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTemplateApi {
    base_url: String,
    client: Client,
}

impl HttpTemplateApi {
    /// Build a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    /// Returns [`ApiError::Transport`] if the TLS backend cannot be set up.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{TEMPLATES_PATH}", self.base_url)
    }

    fn template_url(&self, uuid: &str) -> String {
        format!("{}{TEMPLATES_PATH}/{uuid}", self.base_url)
    }
}

fn ensure_ok(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = ensure_ok(response)?.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl TemplateApi for HttpTemplateApi {
    async fn list(&self) -> Result<Vec<Template>, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, "api.list");
        read_json(self.client.get(&url).send().await?).await
    }

    async fn get(&self, uuid: &str) -> Result<Template, ApiError> {
        let url = self.template_url(uuid);
        tracing::debug!(%url, "api.get");
        read_json(self.client.get(&url).send().await?).await
    }

    async fn create(&self, body: &CreateTemplateRequest) -> Result<Template, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, name = %body.name, "api.create");
        read_json(self.client.post(&url).json(body).send().await?).await
    }

    async fn save(
        &self,
        uuid: &str,
        body: &SaveTemplateRequest,
    ) -> Result<Option<Template>, ApiError> {
        let url = self.template_url(uuid);
        tracing::debug!(%url, "api.save");
        let response = ensure_ok(self.client.post(&url).json(body).send().await?)?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn rename(&self, uuid: &str, body: &RenameTemplateRequest) -> Result<(), ApiError> {
        let url = self.template_url(uuid);
        tracing::debug!(%url, name = %body.name, "api.rename");
        ensure_ok(self.client.post(&url).json(body).send().await?).map(|_| ())
    }

    async fn delete(&self, uuid: &str) -> Result<(), ApiError> {
        let url = self.template_url(uuid);
        tracing::debug!(%url, "api.delete");
        ensure_ok(self.client.delete(&url).send().await?).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let api = HttpTemplateApi::new("http://localhost:9712/api/", Duration::from_secs(1))
            .expect("client");
        assert_eq!(api.base_url(), "http://localhost:9712/api");
        assert_eq!(
            api.collection_url(),
            "http://localhost:9712/api/content/templates"
        );
        assert_eq!(
            api.template_url("abc"),
            "http://localhost:9712/api/content/templates/abc"
        );
    }
}
