//! The email template record and the request bodies sent for it.

use serde::{Deserialize, Serialize};

/// An email template as stored by the content API.
///
/// `uuid` is assigned by the server and never changes. Every other field is
/// mutable through an explicit save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "UUID")]
    pub uuid: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Subject", default)]
    pub subject: String,
    #[serde(rename = "PreviewText", default)]
    pub preview_text: Option<String>,
    #[serde(rename = "HTMLBody", default)]
    pub html_body: String,
    #[serde(rename = "CreatedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "UpdatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Template {
    /// Build a template with the editable fields set and no timestamps.
    pub fn new(
        uuid: impl Into<String>,
        name: impl Into<String>,
        subject: impl Into<String>,
        preview_text: Option<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            subject: subject.into(),
            preview_text: normalize_preview_text(preview_text.as_deref()),
            html_body: html_body.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Body for the rename call. Only `name` is meant to change; subject and
    /// body are sent as they are.
    pub fn rename_request(&self, name: &str) -> RenameTemplateRequest {
        RenameTemplateRequest {
            name: name.to_string(),
            subject: self.subject.clone(),
            html_body: self.html_body.clone(),
        }
    }

    /// Body for the full update issued by autosave.
    pub fn save_request(&self) -> SaveTemplateRequest {
        SaveTemplateRequest {
            name: self.name.clone(),
            subject: self.subject.clone(),
            preview_text: normalize_preview_text(self.preview_text.as_deref()),
            html_body: self.html_body.clone(),
        }
    }
}

/// `""` and absent preview text mean the same thing.
pub fn normalize_preview_text(text: Option<&str>) -> Option<String> {
    match text {
        Some(t) if !t.is_empty() => Some(t.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameTemplateRequest {
    pub name: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveTemplateRequest {
    pub name: String,
    pub subject: String,
    pub preview_text: Option<String>,
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub subject: String,
    pub html_body: String,
}

impl CreateTemplateRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: String::new(),
            html_body: String::new(),
        }
    }
}
