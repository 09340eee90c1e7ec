//! Snapshot export for static hosting.
//!
//! Fetches every fixed query the site uses once, straight from the
//! transport (no cache), and writes each raw `{ "data": ... }` envelope to
//! its own JSON file. `SnapshotTransport` reads the files back by the same
//! name, so a client pointed at the export directory serves the exported
//! content offline. Per-slug and per-id lookups are not exported.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{endpoints, Query, QueryShape, Transport, DEFAULT_BESTSELLER_LIMIT};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Homepage news strip size
const HOMEPAGE_ARTICLE_LIMIT: u32 = 3;

/// File name for a query's snapshot: path and parameters flattened to
/// `[A-Za-z0-9_-]`, runs of other characters collapsed to one `_`. Legacy
/// queries keep the names the old export script gave them.
pub fn snapshot_file_name(query: &str) -> String {
    if let Some(file) = endpoints::legacy_snapshot_file(query) {
        return file.to_string();
    }
    let mut name = String::with_capacity(query.len() + 5);
    let mut pending_sep = false;
    for c in query.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            if pending_sep && !name.is_empty() {
                name.push('_');
            }
            pending_sep = false;
            name.push(c);
        } else {
            pending_sep = true;
        }
    }
    if name.is_empty() {
        name.push_str("root");
    }
    name.push_str(".json");
    name
}

#[derive(Debug, Clone)]
pub struct SiteQuery {
    pub name: &'static str,
    pub query: Query,
}

impl SiteQuery {
    fn new(name: &'static str, query: Query) -> Self {
        Self { name, query }
    }
}

/// Every non-parameterised query the site issues. The legacy schema only
/// ever exported its three collections.
pub fn site_queries(shape: QueryShape) -> Vec<SiteQuery> {
    if shape == QueryShape::Legacy {
        return vec![
            SiteQuery::new("categories", endpoints::categories(shape)),
            SiteQuery::new("products", endpoints::all_products(shape)),
            SiteQuery::new("articles", endpoints::articles(shape, None)),
        ];
    }
    vec![
        SiteQuery::new("categories", endpoints::categories(shape)),
        SiteQuery::new("subcategories", endpoints::subcategories()),
        SiteQuery::new("products", endpoints::all_products(shape)),
        SiteQuery::new("bestsellers", endpoints::flagged_bestsellers(DEFAULT_BESTSELLER_LIMIT)),
        SiteQuery::new("bestsellers_fallback", endpoints::first_products(DEFAULT_BESTSELLER_LIMIT)),
        SiteQuery::new("articles", endpoints::articles(shape, None)),
        SiteQuery::new("articles_latest", endpoints::articles(shape, Some(HOMEPAGE_ARTICLE_LIMIT))),
        SiteQuery::new("education_events", endpoints::education_events()),
        SiteQuery::new("educators", endpoints::educators()),
        SiteQuery::new("trainings", endpoints::trainings()),
        SiteQuery::new("distributors", endpoints::distributors()),
        SiteQuery::new("education_page", endpoints::education_page()),
        SiteQuery::new("homepage_hero", endpoints::homepage_hero()),
        SiteQuery::new("homepage_about", endpoints::homepage_about()),
        SiteQuery::new("about_page", endpoints::about_page()),
        SiteQuery::new("contact_info", endpoints::contact_info()),
        SiteQuery::new("products_page", endpoints::products_page()),
        SiteQuery::new("news_page", endpoints::news_page()),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Point media at the statically hosted copy: `/uploads/` becomes `assets/uploads/`
    pub rewrite_uploads: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub query: String,
    pub file: String,
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: usize,
    pub failed: usize,
}

pub async fn export_snapshots(
    transport: &dyn Transport,
    queries: &[SiteQuery],
    dir: &Path,
    options: &ExportOptions,
) -> Result<ExportReport> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let keys: Vec<String> = queries.iter().map(|q| q.query.key()).collect();
    let results = futures::future::join_all(keys.iter().map(|key| transport.get_json(key))).await;

    let mut report = ExportReport::default();
    let mut entries = Vec::with_capacity(queries.len());

    for ((site_query, key), result) in queries.iter().zip(&keys).zip(results) {
        let file = snapshot_file_name(key);
        let ok = match result {
            Ok(body) => {
                let mut contents = serde_json::to_string_pretty(&body)?;
                if options.rewrite_uploads {
                    contents = contents.replace("\"/uploads/", "\"assets/uploads/");
                }
                std::fs::write(dir.join(&file), contents)
                    .with_context(|| format!("Failed to write snapshot: {}", file))?;
                info!(name = site_query.name, file = %file, "Snapshot written");
                report.written += 1;
                true
            }
            Err(e) => {
                warn!(name = site_query.name, query = %key, error = %e, "Snapshot fetch failed");
                report.failed += 1;
                false
            }
        };
        entries.push(ManifestEntry {
            name: site_query.name.to_string(),
            query: key.clone(),
            file,
            ok,
        });
    }

    let manifest = Manifest {
        exported_at: Utc::now(),
        entries,
    };
    std::fs::write(dir.join(MANIFEST_FILE), serde_json::to_string_pretty(&manifest)?)
        .context("Failed to write snapshot manifest")?;

    Ok(report)
}
