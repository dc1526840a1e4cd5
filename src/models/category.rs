//! Review categories and their reported totals.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the review-status partitions the source exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Finished reading
    Read,
    /// Currently reading
    Reading,
    /// Wants to read
    WantToRead,
}

impl Category {
    /// All categories in crawl order.
    pub const ALL: [Category; 3] = [Category::Read, Category::Reading, Category::WantToRead];

    /// Value of the `status` query parameter.
    pub fn status_code(self) -> &'static str {
        match self {
            Category::Read => "P",
            Category::Reading => "N",
            Category::WantToRead => "F",
        }
    }

    /// Tab label as printed on the source page.
    pub fn label(self) -> &'static str {
        match self {
            Category::Read => "读过",
            Category::Reading => "在读",
            Category::WantToRead => "想读",
        }
    }

    /// Command-line / config name.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Read => "read",
            Category::Reading => "reading",
            Category::WantToRead => "want-to-read",
        }
    }

    /// Map a source tab label back to its category.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized || c.status_code().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "unknown category '{s}' (expected read, reading or want-to-read)"
                ))
            })
    }
}

/// Total number of reviews the source reports per category.
pub type CategoryCounts = BTreeMap<Category, usize>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("看过"), None);
    }

    #[test]
    fn test_from_str_accepts_names_and_codes() {
        assert_eq!("read".parse::<Category>().unwrap(), Category::Read);
        assert_eq!("Want-To-Read".parse::<Category>().unwrap(), Category::WantToRead);
        assert_eq!("n".parse::<Category>().unwrap(), Category::Reading);
        assert!("wishlist".parse::<Category>().is_err());
    }

    #[test]
    fn test_counts_iterate_in_crawl_order() {
        let mut counts = CategoryCounts::new();
        counts.insert(Category::WantToRead, 3);
        counts.insert(Category::Read, 1);
        counts.insert(Category::Reading, 2);
        let order: Vec<_> = counts.keys().copied().collect();
        assert_eq!(order, Category::ALL.to_vec());
    }
}
