//! Marquee-Common: shared types, identifiers, and catalog records.
//!
//! This crate provides functionality used across marquee:
//!
//! - **Typed IDs**: UUID wrappers for movies and admins
//! - **Core Types**: category, sort key and sort order enums used by catalog listings
//! - **Catalog records**: movie/series documents with links, subtitles and seasons
//! - **Source resolution**: picking the playable link for a record selection
//! - **Error Handling**: common error type and result alias
//!
//! # Examples
//!
//! ```
//! use marquee_common::{Category, MovieId, SortKey};
//!
//! let id = MovieId::new();
//! assert_eq!(Category::parse_lenient("series"), Some(Category::Series));
//! assert_eq!(SortKey::parse_lenient("whatever"), SortKey::UploadDate);
//! # let _ = id;
//! ```

pub mod catalog;
pub mod error;
pub mod ids;
pub mod source;
pub mod types;

pub use catalog::*;
pub use error::{Error, Result};
pub use ids::*;
pub use source::{resolve_source, MediaSource, SourceSelection};
pub use types::*;
