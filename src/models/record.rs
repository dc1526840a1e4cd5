//! Review record data structure.

use std::fmt;

use serde::{Serialize, Serializer};

/// Star rating attached to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rating {
    /// One to five stars
    Stars(u8),
    /// No rating, or an encoding the crawler does not recognise
    #[default]
    Unrated,
}

impl Rating {
    /// Class-name prefix carrying the encoded rating (`allstar40`).
    pub const CLASS_PREFIX: &'static str = "allstar";

    /// Decode a class token such as `allstar40`.
    ///
    /// Only `10`, `20`, `30`, `40` and `50` are valid encodings.
    pub fn from_class(token: &str) -> Option<Self> {
        let encoded: u8 = token.strip_prefix(Self::CLASS_PREFIX)?.parse().ok()?;
        match encoded {
            10 | 20 | 30 | 40 | 50 => Some(Rating::Stars(encoded / 10)),
            _ => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Stars(n) => write!(f, "{n}.0"),
            Rating::Unrated => f.write_str("unrated"),
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single review extracted from a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Stable unique review identifier
    pub id: String,

    /// Reviewer display name
    pub author: Option<String>,

    /// Reviewer profile link
    pub author_profile_url: Option<String>,

    /// Star rating
    pub rating: Rating,

    /// Short review text, empty when the review has no text
    pub body: String,

    /// Timestamp as printed by the source
    pub posted_at: String,

    /// Link to the review itself
    pub permalink: Option<String>,

    /// Reviewer location, if shown
    pub location: Option<String>,

    /// "Helpful" votes
    pub helpful_count: u64,
}

/// Flat row written to the exported table.
///
/// Field order is the column order.
#[derive(Debug, Serialize)]
pub struct RecordRow<'a> {
    pub id: &'a str,
    pub author: &'a str,
    pub body: &'a str,
    pub rating: Rating,
    pub posted_at: &'a str,
    pub location: &'a str,
    pub helpful_count: u64,
}

impl<'a> From<&'a Record> for RecordRow<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            id: &record.id,
            author: record.author.as_deref().unwrap_or(""),
            body: &record.body,
            rating: record.rating,
            posted_at: &record.posted_at,
            location: record.location.as_deref().unwrap_or(""),
            helpful_count: record.helpful_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_from_class() {
        assert_eq!(Rating::from_class("allstar40"), Some(Rating::Stars(4)));
        assert_eq!(Rating::from_class("allstar10"), Some(Rating::Stars(1)));
        assert_eq!(Rating::from_class("allstar35"), None);
        assert_eq!(Rating::from_class("allstar00"), None);
        assert_eq!(Rating::from_class("allstar"), None);
        assert_eq!(Rating::from_class("rating"), None);
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(Rating::Stars(4).to_string(), "4.0");
        assert_eq!(Rating::Unrated.to_string(), "unrated");
    }

    #[test]
    fn test_row_flattens_optionals() {
        let record = Record {
            id: "42".to_string(),
            body: "good".to_string(),
            posted_at: "2024-01-01".to_string(),
            ..Record::default()
        };
        let row = RecordRow::from(&record);
        assert_eq!(row.author, "");
        assert_eq!(row.location, "");
        assert_eq!(row.rating, Rating::Unrated);
    }
}
