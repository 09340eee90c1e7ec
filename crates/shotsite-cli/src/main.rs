//! shotsite - fetch and snapshot content from the Shot Cosmetics CMS.
//!
//! `shotsite fetch <resource>` prints what the site's content client sees
//! for a resource, as JSON. `shotsite export --out <dir>` snapshots every
//! fixed site query to JSON files for static hosting.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shotsite_core::api::{HttpTransport, DEFAULT_BESTSELLER_LIMIT};
use shotsite_core::export::{export_snapshots, site_queries, ExportOptions};
use shotsite_core::{Config, ContentClient};

#[derive(Parser, Debug)]
#[command(name = "shotsite", version, about)]
struct Cli {
    /// CMS origin, overriding config and SHOTSITE_CMS_URL
    #[arg(long)]
    cms_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one resource and print it as JSON
    Fetch {
        resource: Resource,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Snapshot all site queries to JSON files
    Export {
        #[arg(long, default_value = "assets/data")]
        out: PathBuf,
        /// Rewrite `/uploads/` media paths to `assets/uploads/`
        #[arg(long)]
        rewrite_uploads: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Resource {
    Categories,
    Subcategories,
    Category,
    Products,
    Product,
    Bestsellers,
    Articles,
    Article,
    Events,
    Event,
    Educators,
    Trainings,
    Training,
    Distributors,
    HomepageHero,
    HomepageAbout,
    AboutPage,
    ContactInfo,
    ProductsPage,
    NewsPage,
    EducationPage,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn require<'a>(value: &'a Option<String>, flag: &str, resource: Resource) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--{} is required for {:?}", flag, resource))
}

async fn fetch(
    client: &ContentClient,
    resource: Resource,
    slug: Option<String>,
    id: Option<String>,
    limit: Option<u32>,
) -> Result<Value> {
    let value = match resource {
        Resource::Categories => serde_json::to_value(client.list_categories().await)?,
        Resource::Subcategories => serde_json::to_value(client.list_subcategories(slug.as_deref()).await)?,
        Resource::Category => {
            let slug = require(&slug, "slug", resource)?;
            serde_json::to_value(client.get_category_full(slug).await)?
        }
        Resource::Products => match slug.as_deref() {
            Some(category) => serde_json::to_value(client.list_products_by_category(category).await)?,
            None => serde_json::to_value(client.list_all_products().await)?,
        },
        Resource::Product => match (&slug, &id) {
            (_, Some(id)) => serde_json::to_value(client.find_product_by_id(id).await)?,
            (Some(slug), None) => serde_json::to_value(client.find_product_by_slug(slug).await)?,
            (None, None) => anyhow::bail!("--slug or --id is required for {:?}", resource),
        },
        Resource::Bestsellers => serde_json::to_value(
            client.list_bestsellers(limit.unwrap_or(DEFAULT_BESTSELLER_LIMIT)).await,
        )?,
        Resource::Articles => serde_json::to_value(client.list_articles(limit).await)?,
        Resource::Article => {
            let slug = require(&slug, "slug", resource)?;
            serde_json::to_value(client.find_article_by_slug(slug).await)?
        }
        Resource::Events => serde_json::to_value(client.list_education_events().await)?,
        Resource::Event => {
            let id = require(&id, "id", resource)?;
            serde_json::to_value(client.find_event_by_id(id).await)?
        }
        Resource::Educators => serde_json::to_value(client.list_educators().await)?,
        Resource::Trainings => serde_json::to_value(client.list_trainings().await)?,
        Resource::Training => {
            let id = require(&id, "id", resource)?;
            serde_json::to_value(client.find_training_by_id(id).await)?
        }
        Resource::Distributors => serde_json::to_value(client.list_distributors().await)?,
        Resource::HomepageHero => serde_json::to_value(client.homepage_hero().await)?,
        Resource::HomepageAbout => serde_json::to_value(client.homepage_about().await)?,
        Resource::AboutPage => serde_json::to_value(client.about_page().await)?,
        Resource::ContactInfo => serde_json::to_value(client.contact_info().await)?,
        Resource::ProductsPage => serde_json::to_value(client.products_page().await)?,
        Resource::NewsPage => serde_json::to_value(client.news_page().await)?,
        Resource::EducationPage => serde_json::to_value(client.education_page().await)?,
    };
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.cms_url {
        config.base_url = url;
    }
    info!(base_url = %config.base_url, data_source = ?config.data_source, "Configuration loaded");

    match cli.command {
        Command::Fetch { resource, slug, id, limit } => {
            let client = ContentClient::from_config(&config)?;
            let value = fetch(&client, resource, slug, id, limit).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Export { out, rewrite_uploads } => {
            // Snapshots always come from the live CMS
            let transport = HttpTransport::new(&config.base_url)?;
            let queries = site_queries(config.query_shape);
            let report = export_snapshots(
                &transport,
                &queries,
                &out,
                &ExportOptions { rewrite_uploads },
            )
            .await?;
            println!(
                "Exported {} snapshots to {} ({} failed)",
                report.written,
                out.display(),
                report.failed
            );
        }
    }

    Ok(())
}
