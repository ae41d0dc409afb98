//! Core enums used by catalog listings.
//!
//! Wire spellings follow the web client: categories are lowercase, sort keys
//! are camelCase. Query-string parsing is lenient; unknown values fall back to
//! the listing defaults instead of failing the request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A single film with one or more source links.
    Movie,
    /// A show with seasons and episodes.
    Series,
}

impl Category {
    /// Parse a `cat` query value. Anything other than `movie`/`series` means "no filter".
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "series" => Ok(Self::Series),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

/// Field a catalog listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// When the record was added to the catalog.
    #[default]
    UploadDate,
    /// The title's release date.
    ReleaseDate,
}

impl SortKey {
    /// `releaseDate` selects release ordering, everything else upload ordering.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "releaseDate" => Self::ReleaseDate,
            _ => Self::UploadDate,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UploadDate => write!(f, "uploadDate"),
            Self::ReleaseDate => write!(f, "releaseDate"),
        }
    }
}

/// Listing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` selects ascending order, everything else descending.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn is_descending(self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::Movie).unwrap(), "\"movie\"");
        assert_eq!(
            serde_json::from_str::<Category>("\"series\"").unwrap(),
            Category::Series
        );
    }

    #[test]
    fn test_category_lenient_parse() {
        assert_eq!(Category::parse_lenient("movie"), Some(Category::Movie));
        assert_eq!(Category::parse_lenient("all"), None);
        assert_eq!(Category::parse_lenient("Movie"), None);
    }

    #[test]
    fn test_sort_key_defaults_to_upload_date() {
        assert_eq!(SortKey::parse_lenient("releaseDate"), SortKey::ReleaseDate);
        assert_eq!(SortKey::parse_lenient("uploadDate"), SortKey::UploadDate);
        assert_eq!(SortKey::parse_lenient("title"), SortKey::UploadDate);
        assert_eq!(SortKey::default(), SortKey::UploadDate);
    }

    #[test]
    fn test_sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::parse_lenient("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient("ASC"), SortOrder::Desc);
        assert!(SortOrder::default().is_descending());
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(SortKey::ReleaseDate.to_string(), "releaseDate");
        assert_eq!(SortOrder::Asc.to_string(), "asc");
        assert_eq!(Category::Series.to_string(), "series");
    }
}
