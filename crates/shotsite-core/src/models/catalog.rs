use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{null_as_default, Media};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub sort_order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Nested category reference embedded in products and subcategories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<CategoryRef>,
    pub image: Option<Media>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_bestseller: bool,
    pub sort_order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_ref().and_then(|c| c.slug.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<CategoryRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    pub sort_order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subcategory {
    pub fn belongs_to(&self, category_slug: &str) -> bool {
        self.category
            .as_ref()
            .and_then(|c| c.slug.as_deref())
            .is_some_and(|s| s == category_slug)
    }
}

/// A category page's content. A category is either flat (direct products)
/// or grouped (subcategories); at most one of the two lists is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryFull {
    pub category: Option<Category>,
    pub products: Vec<Product>,
    pub subcategories: Vec<Subcategory>,
}

impl CategoryFull {
    pub fn is_grouped(&self) -> bool {
        !self.subcategories.is_empty()
    }
}
