//! shotsite-core - content and navigation core for the Shot Cosmetics site.
//!
//! - [`api`]: CMS content client with a read-through TTL cache
//! - [`menu`]: drill-down navigation menu state machine
//! - [`export`]: snapshot export for static hosting
//! - [`models`]: typed CMS resources and media URL resolution

pub mod api;
pub mod cache;
pub mod config;
pub mod export;
pub mod menu;
pub mod models;
pub mod utils;

pub use api::{ApiError, ContentClient, Query, QueryShape};
pub use config::{Config, DataSource};
pub use menu::{MenuController, MenuEvent, MenuTree, Outcome};
