//! Query shapes for every CMS resource the site reads.
//!
//! Shared by the content client and the snapshot exporter so both hit the
//! exact same cache keys / snapshot file names.

use super::query::{Query, QueryShape, SortOrder};

/// Page size used for "fetch everything" collection queries.
pub const FULL_PAGE_SIZE: u32 = 100;

fn path_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes()).collect()
}

// ===== Catalog =====

pub fn categories(shape: QueryShape) -> Query {
    match shape {
        QueryShape::Current => Query::new("/product-categories").sort("sort_order", SortOrder::Asc),
        QueryShape::Legacy => Query::new("/categories")
            .populate_field(&["products", "populate"], "image")
            .sort("order", SortOrder::Asc),
    }
}

pub fn subcategories() -> Query {
    Query::new("/product-subcategories")
        .populate_field(&["products", "populate", "0"], "image")
        .populate_field(&["category"], "true")
        .page_size(FULL_PAGE_SIZE)
        .sort("sort_order", SortOrder::Asc)
}

pub fn all_products(shape: QueryShape) -> Query {
    match shape {
        QueryShape::Current => Query::new("/products")
            .populate_all()
            .page_size(FULL_PAGE_SIZE)
            .sort("sort_order", SortOrder::Asc),
        QueryShape::Legacy => Query::new("/products").populate_all(),
    }
}

pub fn products_by_category(category_slug: &str) -> Query {
    all_products(QueryShape::Current).filter_eq(&["category", "slug"], category_slug)
}

pub fn product_by_slug(slug: &str) -> Query {
    Query::new("/products").filter_eq(&["slug"], slug).populate_all()
}

pub fn product_by_id(document_id: &str) -> Query {
    Query::new(format!("/products/{}", path_segment(document_id))).populate_all()
}

pub fn flagged_bestsellers(limit: u32) -> Query {
    Query::new("/products")
        .populate_all()
        .filter_eq(&["is_bestseller"], "true")
        .limit(limit)
        .sort("sort_order", SortOrder::Asc)
}

pub fn first_products(limit: u32) -> Query {
    Query::new("/products")
        .populate_all()
        .limit(limit)
        .sort("sort_order", SortOrder::Asc)
}

// ===== News =====

/// The legacy schema was never paginated, so `limit` only applies to the
/// current shape; the client trims legacy results itself.
pub fn articles(shape: QueryShape, limit: Option<u32>) -> Query {
    match shape {
        QueryShape::Current => {
            let query = Query::new("/news-articles")
                .populate_all()
                .sort("published_date", SortOrder::Desc);
            match limit {
                Some(n) => query.limit(n),
                None => query.page_size(FULL_PAGE_SIZE),
            }
        }
        QueryShape::Legacy => Query::new("/articles")
            .populate_all()
            .sort("publishedAt", SortOrder::Desc),
    }
}

pub fn article_by_slug(slug: &str) -> Query {
    Query::new("/news-articles").filter_eq(&["slug"], slug).populate_all()
}

/// Snapshot file the old export script wrote for a legacy query.
pub fn legacy_snapshot_file(query: &str) -> Option<&'static str> {
    [
        (categories(QueryShape::Legacy), "categories.json"),
        (all_products(QueryShape::Legacy), "products.json"),
        (articles(QueryShape::Legacy, None), "articles.json"),
    ]
    .into_iter()
    .find(|(q, _)| q.key() == query)
    .map(|(_, file)| file)
}

// ===== Education =====

pub fn education_events() -> Query {
    Query::new("/education-events").populate_all().sort("date", SortOrder::Asc)
}

pub fn education_event_by_id(document_id: &str) -> Query {
    Query::new(format!("/education-events/{}", path_segment(document_id))).populate_all()
}

pub fn educators() -> Query {
    Query::new("/educators").populate_all()
}

pub fn trainings() -> Query {
    Query::new("/trainings").populate_all().sort("title", SortOrder::Asc)
}

pub fn training_by_id(document_id: &str) -> Query {
    Query::new(format!("/trainings/{}", path_segment(document_id))).populate_all()
}

// ===== Distributors =====

pub fn distributors() -> Query {
    Query::new("/regional-distributors")
        .populate_indexed(&["representatives"])
        .page_size(FULL_PAGE_SIZE)
}

// ===== Single types (page content) =====

pub fn education_page() -> Query {
    Query::new("/education-page").populate_indexed(&["hero_image", "program_image", "program_features"])
}

pub fn homepage_hero() -> Query {
    Query::new("/homepage-hero").populate_all()
}

pub fn homepage_about() -> Query {
    Query::new("/homepage-about").populate_indexed(&["stats", "image"])
}

pub fn about_page() -> Query {
    Query::new("/about-page").populate_indexed(&["history_image", "hero_image", "values", "values.icon"])
}

pub fn contact_info() -> Query {
    Query::new("/contact-info").populate_all()
}

pub fn products_page() -> Query {
    Query::new("/products-page").populate_all()
}

pub fn news_page() -> Query {
    Query::new("/news-page").populate_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shapes() {
        assert_eq!(categories(QueryShape::Current).key(), "/product-categories?sort=sort_order:asc");
        assert_eq!(
            products_by_category("koloryzacja").key(),
            "/products?populate=*&pagination[pageSize]=100&sort=sort_order:asc&filters[category][slug][$eq]=koloryzacja"
        );
        assert_eq!(
            flagged_bestsellers(3).key(),
            "/products?populate=*&filters[is_bestseller][$eq]=true&pagination[limit]=3&sort=sort_order:asc"
        );
        assert_eq!(product_by_id("k3x9").key(), "/products/k3x9?populate=*");
    }

    #[test]
    fn test_article_pagination_variants() {
        assert_eq!(
            articles(QueryShape::Current, Some(4)).key(),
            "/news-articles?populate=*&sort=published_date:desc&pagination[limit]=4"
        );
        assert_eq!(
            articles(QueryShape::Current, None).key(),
            "/news-articles?populate=*&sort=published_date:desc&pagination[pageSize]=100"
        );
    }

    #[test]
    fn test_legacy_shapes_match_old_export() {
        assert_eq!(
            categories(QueryShape::Legacy).key(),
            "/categories?populate[products][populate]=image&sort=order:asc"
        );
        assert_eq!(all_products(QueryShape::Legacy).key(), "/products?populate=*");
        assert_eq!(articles(QueryShape::Legacy, Some(3)).key(), "/articles?populate=*&sort=publishedAt:desc");

        assert_eq!(legacy_snapshot_file("/products?populate=*"), Some("products.json"));
        assert_eq!(legacy_snapshot_file(&all_products(QueryShape::Current).key()), None);
    }

    #[test]
    fn test_page_content_shapes() {
        assert_eq!(
            about_page().key(),
            "/about-page?populate[0]=history_image&populate[1]=hero_image&populate[2]=values&populate[3]=values.icon"
        );
        assert_eq!(
            distributors().key(),
            "/regional-distributors?populate[0]=representatives&pagination[pageSize]=100"
        );
    }

    #[test]
    fn test_ids_are_escaped() {
        assert_eq!(training_by_id("a/b").key(), "/trainings/a%2Fb?populate=*");
    }
}
