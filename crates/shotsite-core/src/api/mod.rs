//! REST API client module for the headless CMS.
//!
//! This module provides the `ContentClient` for reading catalog, news,
//! education and page content from the CMS, the `Query` builder used to
//! shape requests, and the `Transport` seam between the client and the
//! network (or exported snapshots).
//!
//! The API is public and read-only; no authentication is involved.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod query;
pub mod transport;

pub use client::{ContentClient, DEFAULT_BESTSELLER_LIMIT};
pub use error::ApiError;
pub use query::{Query, QueryShape, SortOrder};
pub use transport::{HttpTransport, SnapshotTransport, Transport};
