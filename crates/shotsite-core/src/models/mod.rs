//! Data models for CMS resources.
//!
//! Only the fields the site actually reads are typed; every other field the
//! CMS sends is kept verbatim in a flattened `extra` map so it survives a
//! round trip through the client.
//!
//! - `Category`, `Subcategory`, `Product`, `CategoryFull`: product catalog
//! - `Article`, `EducationEvent`, `Educator`, `Training`, `Distributor`:
//!   collection content
//! - `PageContent`: singleton page documents
//! - `Media`: uploaded files and image size variants

pub mod catalog;
pub mod content;
pub mod media;

pub use catalog::{Category, CategoryFull, CategoryRef, Product, Subcategory};
pub use content::{Article, Distributor, EducationEvent, Educator, PageContent, Representative, Training};
pub use media::{resolve_file_url, resolve_image_url, Media, MediaFormat, MediaFormats};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
