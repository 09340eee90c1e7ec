//! Content client for the CMS REST API.
//!
//! This module provides the `ContentClient` struct, a read-through cache in
//! front of a `Transport`. Resource operations never fail: transport and
//! parse errors are logged and turned into the last good cached value, or
//! into an empty/`None` default when nothing was cached.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::endpoints;
use super::query::{Query, QueryShape};
use super::transport::{HttpTransport, SnapshotTransport, Transport};
use super::ApiError;
use crate::cache::ResponseCache;
use crate::config::{Config, DataSource};
use crate::models::{
    resolve_file_url, resolve_image_url, Article, Category, CategoryFull, Distributor,
    EducationEvent, Educator, Media, PageContent, Product, Subcategory, Training,
};

/// Number of products shown in the homepage bestseller strip.
pub const DEFAULT_BESTSELLER_LIMIT: u32 = 3;

/// Response envelope: every CMS endpoint wraps its payload in `data`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
}

/// CMS content client.
/// Clone is cheap and clones share one cache.
#[derive(Clone)]
pub struct ContentClient {
    transport: Arc<dyn Transport>,
    cache: Arc<Mutex<ResponseCache>>,
    origin: String,
    shape: QueryShape,
}

impl ContentClient {
    /// Create a client with the default TTL and the current query shape.
    /// `origin` is used to qualify relative media URLs.
    pub fn new(transport: Arc<dyn Transport>, origin: &str) -> Self {
        Self {
            transport,
            cache: Arc::new(Mutex::new(ResponseCache::default())),
            origin: origin.trim_end_matches('/').to_string(),
            shape: QueryShape::default(),
        }
    }

    /// Build the client described by `config`: live HTTP or exported snapshots.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport: Arc<dyn Transport> = match &config.data_source {
            DataSource::Live => Arc::new(HttpTransport::new(&config.base_url)?),
            DataSource::Static { dir } => Arc::new(SnapshotTransport::new(dir.clone())),
        };
        Ok(Self::new(transport, &config.base_url)
            .with_ttl(config.cache_ttl())
            .with_shape(config.query_shape))
    }

    pub fn with_ttl(self, ttl: Duration) -> Self {
        Self {
            cache: Arc::new(Mutex::new(ResponseCache::new(ttl))),
            ..self
        }
    }

    pub fn with_shape(self, shape: QueryShape) -> Self {
        Self { shape, ..self }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn shape(&self) -> QueryShape {
        self.shape
    }

    fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        // A panic while holding the lock cannot leave the map half-written
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ===== Cache lifecycle =====

    pub fn clear(&self) {
        self.cache().clear();
    }

    pub fn evict(&self, key: &str) -> bool {
        self.cache().evict(key)
    }

    pub fn cache_len(&self) -> usize {
        self.cache().len()
    }

    // ===== Core fetch =====

    /// Fetch the `data` payload for `key` (path plus query string).
    ///
    /// Fresh cache hits are served without a request. On failure the last
    /// cached value for the key is returned regardless of age, or `None`.
    /// Concurrent misses for one key each hit the network; the last write wins.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let cached = self.cache().fresh(key, Utc::now()).map(|e| e.value.clone());
        if let Some(value) = cached {
            debug!(query = key, "Cache hit");
            return value;
        }

        match self.fetch(key).await {
            Ok(value) => {
                self.cache().store(key, value.clone(), Utc::now());
                value
            }
            Err(e) => {
                let stale = self
                    .cache()
                    .stale(key)
                    .map(|entry| (entry.value.clone(), entry.age(Utc::now())));
                match stale {
                    Some((value, age)) => {
                        warn!(query = key, error = %e, age_secs = age.num_seconds(), "Fetch failed, serving stale cache");
                        value
                    }
                    None => {
                        error!(query = key, error = %e, "Fetch failed with nothing cached");
                        None
                    }
                }
            }
        }
    }

    async fn fetch(&self, key: &str) -> Result<Option<Value>, ApiError> {
        let body = self.transport.get_json(key).await?;
        if !body.is_object() {
            return Err(ApiError::InvalidResponse(format!(
                "{}: expected envelope object, got {}",
                key,
                json_kind(&body)
            )));
        }
        let envelope: Envelope = serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", key, e)))?;
        Ok(envelope.data.filter(|v| !v.is_null()))
    }

    /// Collection payload decoded element by element; malformed elements are skipped.
    async fn fetch_list<T: DeserializeOwned>(&self, query: &Query) -> Vec<T> {
        let key = query.key();
        match self.get(&key).await {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value(item) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(query = %key, error = %e, "Skipping malformed item");
                        None
                    }
                })
                .collect(),
            Some(other) => {
                warn!(query = %key, kind = json_kind(&other), "Expected a list payload");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Single-object payload.
    async fn fetch_one<T: DeserializeOwned>(&self, query: &Query) -> Option<T> {
        let key = query.key();
        let value = self.get(&key).await?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(query = %key, error = %e, "Malformed payload");
                None
            }
        }
    }

    /// First element of a filtered collection query.
    async fn fetch_first<T: DeserializeOwned>(&self, query: &Query) -> Option<T> {
        self.fetch_list(query).await.into_iter().next()
    }

    // ===== Products & categories =====

    pub async fn list_categories(&self) -> Vec<Category> {
        self.fetch_list(&endpoints::categories(self.shape)).await
    }

    /// All subcategories, or only those whose nested category matches
    /// `category_slug`. The full set is fetched once and filtered locally.
    pub async fn list_subcategories(&self, category_slug: Option<&str>) -> Vec<Subcategory> {
        let subcategories: Vec<Subcategory> = self.fetch_list(&endpoints::subcategories()).await;
        match category_slug {
            Some(slug) => subcategories.into_iter().filter(|s| s.belongs_to(slug)).collect(),
            None => subcategories,
        }
    }

    /// The legacy schema has no category filter, so there the full product
    /// list is filtered locally.
    pub async fn list_products_by_category(&self, category_slug: &str) -> Vec<Product> {
        match self.shape {
            QueryShape::Current => self.fetch_list(&endpoints::products_by_category(category_slug)).await,
            QueryShape::Legacy => self
                .list_all_products()
                .await
                .into_iter()
                .filter(|p| p.category_slug() == Some(category_slug))
                .collect(),
        }
    }

    pub async fn list_all_products(&self) -> Vec<Product> {
        self.fetch_list(&endpoints::all_products(self.shape)).await
    }

    pub async fn find_product_by_slug(&self, slug: &str) -> Option<Product> {
        self.fetch_first(&endpoints::product_by_slug(slug)).await
    }

    pub async fn find_product_by_id(&self, document_id: &str) -> Option<Product> {
        self.fetch_one(&endpoints::product_by_id(document_id)).await
    }

    /// Products flagged as bestsellers; when none are flagged, the first
    /// `limit` products in catalog order. Never more than `limit`, whatever
    /// the server returns.
    pub async fn list_bestsellers(&self, limit: u32) -> Vec<Product> {
        let mut flagged: Vec<Product> = self.fetch_list(&endpoints::flagged_bestsellers(limit)).await;
        if !flagged.is_empty() {
            flagged.truncate(limit as usize);
            return flagged;
        }
        debug!(limit, "No bestsellers flagged, using catalog order");
        let mut products: Vec<Product> = self.fetch_list(&endpoints::first_products(limit)).await;
        products.truncate(limit as usize);
        products
    }

    /// Category page content. Categories, subcategories and direct products
    /// are fetched concurrently; a category with subcategories is returned
    /// grouped (no direct products), otherwise flat.
    pub async fn get_category_full(&self, category_slug: &str) -> CategoryFull {
        let (categories, subcategories, products) = tokio::join!(
            self.list_categories(),
            self.list_subcategories(Some(category_slug)),
            self.list_products_by_category(category_slug),
        );

        let category = categories
            .into_iter()
            .find(|c| c.slug.as_deref() == Some(category_slug));

        if subcategories.is_empty() {
            CategoryFull {
                category,
                products,
                subcategories: Vec::new(),
            }
        } else {
            CategoryFull {
                category,
                products: Vec::new(),
                subcategories,
            }
        }
    }

    // ===== News =====

    pub async fn list_articles(&self, limit: Option<u32>) -> Vec<Article> {
        let mut articles: Vec<Article> = self.fetch_list(&endpoints::articles(self.shape, limit)).await;
        if let (QueryShape::Legacy, Some(n)) = (self.shape, limit) {
            articles.truncate(n as usize);
        }
        articles
    }

    pub async fn find_article_by_slug(&self, slug: &str) -> Option<Article> {
        match self.shape {
            QueryShape::Current => self.fetch_first(&endpoints::article_by_slug(slug)).await,
            QueryShape::Legacy => self
                .list_articles(None)
                .await
                .into_iter()
                .find(|a| a.slug.as_deref() == Some(slug)),
        }
    }

    // ===== Education =====

    pub async fn list_education_events(&self) -> Vec<EducationEvent> {
        self.fetch_list(&endpoints::education_events()).await
    }

    pub async fn find_event_by_id(&self, document_id: &str) -> Option<EducationEvent> {
        self.fetch_one(&endpoints::education_event_by_id(document_id)).await
    }

    pub async fn list_educators(&self) -> Vec<Educator> {
        self.fetch_list(&endpoints::educators()).await
    }

    pub async fn list_trainings(&self) -> Vec<Training> {
        self.fetch_list(&endpoints::trainings()).await
    }

    pub async fn find_training_by_id(&self, document_id: &str) -> Option<Training> {
        self.fetch_one(&endpoints::training_by_id(document_id)).await
    }

    // ===== Distributors =====

    pub async fn list_distributors(&self) -> Vec<Distributor> {
        self.fetch_list(&endpoints::distributors()).await
    }

    // ===== Single types (page content) =====

    pub async fn education_page(&self) -> Option<PageContent> {
        self.fetch_one(&endpoints::education_page()).await
    }

    pub async fn homepage_hero(&self) -> Option<PageContent> {
        self.fetch_one(&endpoints::homepage_hero()).await
    }

    pub async fn homepage_about(&self) -> Option<PageContent> {
        self.fetch_one(&endpoints::homepage_about()).await
    }

    pub async fn about_page(&self) -> Option<PageContent> {
        self.fetch_one(&endpoints::about_page()).await
    }

    pub async fn contact_info(&self) -> Option<PageContent> {
        self.fetch_one(&endpoints::contact_info()).await
    }

    pub async fn products_page(&self) -> Option<PageContent> {
        self.fetch_one(&endpoints::products_page()).await
    }

    pub async fn news_page(&self) -> Option<PageContent> {
        self.fetch_one(&endpoints::news_page()).await
    }

    // ===== Media =====

    pub fn resolve_image_url(&self, media: Option<&Media>) -> Option<String> {
        resolve_image_url(media, &self.origin)
    }

    pub fn resolve_file_url(&self, media: Option<&Media>) -> Option<String> {
        resolve_file_url(media, &self.origin)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    const ORIGIN: &str = "https://cms.example.com";

    /// In-memory transport: canned bodies per query, a kill switch and a call counter.
    #[derive(Default)]
    struct FakeTransport {
        responses: Mutex<HashMap<String, Value>>,
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn respond(&self, query: &Query, body: Value) {
            self.responses.lock().expect("lock").insert(query.key(), body);
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get_json(&self, query: &str) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ApiError::ServerError("connection refused".to_string()));
            }
            self.responses
                .lock()
                .expect("lock")
                .get(query)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(query.to_string()))
        }
    }

    fn setup() -> (Arc<FakeTransport>, ContentClient) {
        let fake = Arc::new(FakeTransport::default());
        let client = ContentClient::new(fake.clone(), ORIGIN);
        (fake, client)
    }

    fn product(slug: &str, order: i64) -> Value {
        json!({ "slug": slug, "name": slug.to_uppercase(), "sort_order": order })
    }

    #[tokio::test]
    async fn test_fresh_hit_issues_one_request() {
        let (fake, client) = setup();
        let query = endpoints::educators();
        fake.respond(&query, json!({ "data": [{ "name": "Ola" }] }));

        let first = client.get(&query.key()).await;
        let second = client.get(&query.key()).await;

        assert_eq!(fake.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(first, Some(json!([{ "name": "Ola" }])));
    }

    #[tokio::test]
    async fn test_stale_served_when_refresh_fails() {
        let (fake, client) = setup();
        // Zero TTL: every entry is already expired on the next call
        let client = client.with_ttl(Duration::zero());
        let query = endpoints::trainings();
        fake.respond(&query, json!({ "data": [{ "title": "Koloryzacja" }] }));

        let first = client.get(&query.key()).await;
        fake.set_failing(true);
        let second = client.get(&query.key()).await;

        assert_eq!(fake.calls(), 2);
        assert_eq!(second, first);
        assert!(second.is_some());
    }

    #[tokio::test]
    async fn test_failure_without_cache_yields_defaults() {
        let (fake, client) = setup();
        fake.set_failing(true);

        assert_eq!(client.get("/products").await, None);
        assert!(client.list_all_products().await.is_empty());
        assert!(client.find_product_by_slug("x").await.is_none());
        assert!(client.homepage_hero().await.is_none());
        assert_eq!(client.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_envelope_falls_back_to_stale() {
        let (fake, client) = setup();
        let client = client.with_ttl(Duration::zero());
        let query = endpoints::news_page();
        fake.respond(&query, json!({ "data": { "title": "Aktualności" } }));
        assert!(client.news_page().await.is_some());

        // Body is not an envelope object
        fake.respond(&query, json!(["unexpected"]));
        let page = client.news_page().await.expect("stale page");
        assert_eq!(page.text("title"), Some("Aktualności"));
    }

    #[tokio::test]
    async fn test_null_payload_is_empty_not_error() {
        let (fake, client) = setup();
        fake.respond(&endpoints::contact_info(), json!({ "data": null }));
        fake.respond(&endpoints::educators(), json!({ "data": [] }));

        assert!(client.contact_info().await.is_none());
        assert!(client.list_educators().await.is_empty());
        assert_eq!(client.cache_len(), 2);
    }

    #[tokio::test]
    async fn test_category_full_grouped() {
        let (fake, client) = setup();
        fake.respond(
            &endpoints::categories(QueryShape::Current),
            json!({ "data": [{ "slug": "pielegnacja", "name": "Pielęgnacja" }, { "slug": "koloryzacja" }] }),
        );
        fake.respond(
            &endpoints::subcategories(),
            json!({ "data": [
                { "slug": "szampony", "category": { "slug": "pielegnacja" }, "products": [] },
                { "slug": "farby", "category": { "slug": "koloryzacja" } }
            ] }),
        );
        fake.respond(
            &endpoints::products_by_category("pielegnacja"),
            json!({ "data": [product("odzywka", 1)] }),
        );

        let full = client.get_category_full("pielegnacja").await;
        assert_eq!(full.category.and_then(|c| c.name).as_deref(), Some("Pielęgnacja"));
        assert!(full.products.is_empty());
        assert_eq!(full.subcategories.len(), 1);
        assert_eq!(full.subcategories[0].slug.as_deref(), Some("szampony"));
    }

    #[tokio::test]
    async fn test_category_full_flat() {
        let (fake, client) = setup();
        fake.respond(&endpoints::categories(QueryShape::Current), json!({ "data": [{ "slug": "stylizacja" }] }));
        fake.respond(&endpoints::subcategories(), json!({ "data": [] }));
        fake.respond(
            &endpoints::products_by_category("stylizacja"),
            json!({ "data": [product("wosk", 1), product("pasta", 2)] }),
        );

        let full = client.get_category_full("stylizacja").await;
        assert!(full.category.is_some());
        assert!(full.subcategories.is_empty());
        assert_eq!(full.products.len(), 2);
    }

    #[tokio::test]
    async fn test_bestsellers_fall_back_to_catalog_order() {
        let (fake, client) = setup();
        fake.respond(&endpoints::flagged_bestsellers(3), json!({ "data": [] }));
        // The CMS applies sort and limit to the 5 products server-side
        fake.respond(
            &endpoints::first_products(3),
            json!({ "data": [product("a", 1), product("b", 2), product("c", 3)] }),
        );

        let best = client.list_bestsellers(DEFAULT_BESTSELLER_LIMIT).await;
        let slugs: Vec<_> = best.iter().filter_map(|p| p.slug.as_deref()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn test_bestsellers_capped_at_limit() {
        let (fake, client) = setup();
        fake.respond(&endpoints::flagged_bestsellers(3), json!({ "data": [] }));
        // Server ignored pagination[limit]
        fake.respond(
            &endpoints::first_products(3),
            json!({ "data": [
                product("a", 1), product("b", 2), product("c", 3), product("d", 4), product("e", 5)
            ] }),
        );
        fake.respond(
            &endpoints::flagged_bestsellers(2),
            json!({ "data": [product("x", 1), product("y", 2), product("z", 3)] }),
        );

        let best = client.list_bestsellers(DEFAULT_BESTSELLER_LIMIT).await;
        let slugs: Vec<_> = best.iter().filter_map(|p| p.slug.as_deref()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        assert_eq!(client.list_bestsellers(2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_flagged_bestsellers_skip_fallback() {
        let (fake, client) = setup();
        fake.respond(
            &endpoints::flagged_bestsellers(2),
            json!({ "data": [{ "slug": "hit", "is_bestseller": true }] }),
        );

        let best = client.list_bestsellers(2).await;
        assert_eq!(best.len(), 1);
        assert!(best[0].is_bestseller);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_subcategory_filter() {
        let (fake, client) = setup();
        fake.respond(
            &endpoints::subcategories(),
            json!({ "data": [
                { "slug": "s1", "category": { "slug": "pielegnacja" } },
                { "slug": "s2", "category": { "slug": "koloryzacja" } },
                { "slug": "s3" }
            ] }),
        );

        assert_eq!(client.list_subcategories(None).await.len(), 3);
        let filtered = client.list_subcategories(Some("koloryzacja")).await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].slug.as_deref(), Some("s2"));
        // Both calls share one cached query
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_find_by_slug_takes_first_match() {
        let (fake, client) = setup();
        fake.respond(
            &endpoints::product_by_slug("wosk"),
            json!({ "data": [product("wosk", 7), product("wosk-2", 8)] }),
        );
        fake.respond(&endpoints::product_by_slug("brak"), json!({ "data": [] }));

        let found = client.find_product_by_slug("wosk").await.expect("product");
        assert_eq!(found.sort_order, Some(7));
        assert!(client.find_product_by_slug("brak").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_items_are_skipped() {
        let (fake, client) = setup();
        fake.respond(
            &endpoints::all_products(QueryShape::Current),
            json!({ "data": [product("ok", 1), { "slug": 42 }] }),
        );
        let products = client.list_all_products().await;
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_reordered_parameters_are_distinct_entries() {
        // Known limitation: the cache key is the literal query string.
        let (fake, client) = setup();
        let a = Query::new("/products").populate_all().limit(3);
        let b = Query::new("/products").limit(3).populate_all();
        fake.respond(&a, json!({ "data": [] }));
        fake.respond(&b, json!({ "data": [] }));

        client.get(&a.key()).await;
        client.get(&b.key()).await;
        assert_eq!(fake.calls(), 2);
        assert_eq!(client.cache_len(), 2);
    }

    #[tokio::test]
    async fn test_evict_and_clear_force_refetch() {
        let (fake, client) = setup();
        let query = endpoints::educators();
        fake.respond(&query, json!({ "data": [] }));

        client.get(&query.key()).await;
        assert!(client.evict(&query.key()));
        client.get(&query.key()).await;
        assert_eq!(fake.calls(), 2);

        client.clear();
        assert_eq!(client.cache_len(), 0);
        client.get(&query.key()).await;
        assert_eq!(fake.calls(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_callers_get_same_payload() {
        let (fake, client) = setup();
        let query = endpoints::distributors();
        fake.respond(&query, json!({ "data": [{ "region": "Śląskie" }] }));

        let other = client.clone();
        let (a, b) = tokio::join!(client.list_distributors(), other.list_distributors());
        assert_eq!(a, b);
        assert_eq!(a[0].region.as_deref(), Some("Śląskie"));
        assert_eq!(client.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_legacy_shape_uses_old_queries() {
        let (fake, client) = setup();
        let client = client.with_shape(QueryShape::Legacy);
        fake.respond(
            &endpoints::articles(QueryShape::Legacy, None),
            json!({ "data": [
                { "title": "Nowy", "slug": "nowy" },
                { "title": "Stary", "slug": "stary" },
                { "title": "Najstarszy", "slug": "najstarszy" }
            ] }),
        );
        fake.respond(
            &endpoints::all_products(QueryShape::Legacy),
            json!({ "data": [
                { "slug": "farba", "category": { "slug": "koloryzacja" } },
                { "slug": "wosk", "category": { "slug": "stylizacja" } }
            ] }),
        );

        // Limit applied locally to the unpaginated list
        assert_eq!(client.list_articles(Some(2)).await.len(), 2);
        let found = client.find_article_by_slug("stary").await.expect("article");
        assert_eq!(found.title.as_deref(), Some("Stary"));

        let products = client.list_products_by_category("stylizacja").await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].slug.as_deref(), Some("wosk"));
        // Every call above shares the two cached legacy queries
        assert_eq!(fake.calls(), 2);
    }

    #[test]
    fn test_resolve_urls_use_client_origin() {
        let (_, client) = setup();
        let media: Media = serde_json::from_value(json!({ "url": "/uploads/a.pdf" })).expect("media");
        assert_eq!(
            client.resolve_file_url(Some(&media)).as_deref(),
            Some("https://cms.example.com/uploads/a.pdf")
        );
        assert_eq!(client.resolve_image_url(None), None);
    }
}
