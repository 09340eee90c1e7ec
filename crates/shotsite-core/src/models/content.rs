use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{null_as_default, Media};
use crate::utils::render_rich_text;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub published_date: Option<String>,
    pub content: Option<String>,
    pub image: Option<Media>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    /// Article body with CMS rich-text markup converted to HTML
    pub fn content_html(&self) -> String {
        render_rich_text(self.content.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEvent {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Educator {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub photo: Option<Media>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Training {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distributor {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub region: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub representatives: Vec<Representative>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Singleton page document (hero texts, about page, contact info...).
/// Page layouts differ too much to type, so fields are looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageContent(pub Map<String, Value>);

impl PageContent {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Media field such as `hero_image`; `None` when absent or malformed.
    pub fn media(&self, name: &str) -> Option<Media> {
        self.field(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
