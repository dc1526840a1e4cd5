//! Catalog item display attributes.

use serde::{Deserialize, Serialize};

/// Title and author of the item whose reviews are crawled.
///
/// Both fields are empty strings when the source does not expose them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub item_id: String,
    pub title: String,
    pub author: String,
}
