//! Query builder for the CMS REST API.
//!
//! A `Query` renders to `path?k=v&k=v` with parameters in insertion order.
//! The rendered string doubles as the response cache key, so two queries
//! that differ only in parameter order are distinct cache entries.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// CMS schema generation the client reads.
///
/// `Current` is the authoritative shape. `Legacy` is deprecated: it is the
/// first schema, which only had `/categories`, `/products` and `/articles`,
/// queried exactly as the old export script did so its `categories.json`,
/// `products.json` and `articles.json` files can still be served. Resources
/// that schema never had are always read with the current queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryShape {
    #[default]
    Current,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    path: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Append a raw parameter. Neither key nor value is encoded.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// `populate=*`
    pub fn populate_all(self) -> Self {
        self.param("populate", "*")
    }

    /// `populate[0]=a&populate[1]=b...`
    pub fn populate_indexed(mut self, fields: &[&str]) -> Self {
        for (i, field) in fields.iter().enumerate() {
            self = self.param(format!("populate[{}]", i), *field);
        }
        self
    }

    /// `populate[a][b]...=value`, e.g. `populate[category]=true`
    pub fn populate_field(self, path: &[&str], value: &str) -> Self {
        let key = format!("populate{}", bracketed(path));
        self.param(key, value)
    }

    /// `filters[a][b]...[$eq]=value` with the value percent-encoded
    pub fn filter_eq(self, path: &[&str], value: &str) -> Self {
        let key = format!("filters{}[$eq]", bracketed(path));
        let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
        self.param(key, encoded)
    }

    pub fn sort(self, field: &str, order: SortOrder) -> Self {
        self.param("sort", format!("{}:{}", field, order.as_str()))
    }

    pub fn page_size(self, size: u32) -> Self {
        self.param("pagination[pageSize]", size.to_string())
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("pagination[limit]", limit.to_string())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Exact cache key: path plus query string in insertion order.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

fn bracketed(path: &[&str]) -> String {
    path.iter().map(|p| format!("[{}]", p)).collect()
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        Ok(())
    }
}
