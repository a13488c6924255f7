//! Core domain models, error types, and text/url/hash utilities shared
//! across every Beacon crate.

pub mod error;
pub mod hash;
pub mod model;
pub mod retry;
pub mod scope;
pub mod text;
pub mod url;

pub use error::{BeaconError, ErrorKind, Result};
pub use model::{Chunk, ExtractedPage, IndexedPage, PageSource, RouteResolution};
pub use retry::{retry_with_backoff, Attempt, RetryPolicy};
pub use scope::{sanitize_scope_name, Scope};

/// Re-exported so downstream crates don't need their own `chrono`/`uuid`
/// dependency just to name these types.
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;
