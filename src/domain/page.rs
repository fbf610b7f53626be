//! Paginated wallet API listings.

use serde::Serialize;
use serde_json::Value;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// One page of a listing plus the totals the API reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub item_count: u64,
    pub page_count: u64,
    pub data: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            item_count: 0,
            page_count: 0,
            data: Vec::new(),
        }
    }
}

impl<T> Page<T> {
    /// Builds a page from `{"item_count", "page_count", "data": [..]}`,
    /// mapping every entry of `data`. `None` when `data` is not an array.
    pub fn from_json(json: &Value, item: impl FnMut(&Value) -> T) -> Option<Self> {
        let data = json["data"].as_array()?;
        Some(Self {
            item_count: json["item_count"].as_u64().unwrap_or(data.len() as u64),
            page_count: json["page_count"].as_u64().unwrap_or(1),
            data: data.iter().map(item).collect(),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
