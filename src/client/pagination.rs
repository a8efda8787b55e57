//! Bounded page-by-page aggregation of listing endpoints.

use crate::client::{query_from_map, AsyncPipeRunClient};
use crate::domain::{ApiToken, Resource};
use crate::error::PipeRunResult;
use serde_json::{Map, Value};

/// Largest page size PipeRun accepts.
pub const MAX_PAGE_SIZE: usize = 200;

/// Hard ceiling on pages fetched by one scan.
pub const MAX_PAGES: usize = 20;

/// Page size and page-count ceiling for one scan, clamped to the API limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    page_size: usize,
    max_pages: usize,
}

impl PageBounds {
    pub fn new(page_size: usize, max_pages: usize) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            max_pages: max_pages.clamp(1, MAX_PAGES),
        }
    }

    /// Build bounds from optional caller values, falling back to defaults.
    pub fn from_options(
        page_size: Option<i64>,
        max_pages: Option<i64>,
        defaults: PageBounds,
    ) -> Self {
        let clamp = |v: i64| v.max(1) as usize;
        Self::new(
            page_size.map(clamp).unwrap_or(defaults.page_size),
            max_pages.map(clamp).unwrap_or(defaults.max_pages),
        )
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }
}

impl Default for PageBounds {
    fn default() -> Self {
        Self::new(MAX_PAGE_SIZE, 5)
    }
}

/// Fetch up to `bounds.max_pages()` pages of `resource` and flatten them.
///
/// A page shorter than the page size ends the scan, as does a response that
/// is neither `{data: [...]}` nor a bare array. Upstream errors propagate.
pub async fn fetch_all(
    client: &dyn AsyncPipeRunClient,
    token: &ApiToken,
    resource: Resource,
    filter: &Map<String, Value>,
    bounds: PageBounds,
) -> PipeRunResult<Vec<Value>> {
    let mut out = Vec::new();
    let show = bounds.page_size();

    for page in 1..=bounds.max_pages() {
        let mut params = filter.clone();
        params.insert("page".to_string(), Value::from(page));
        params.insert("show".to_string(), Value::from(show));

        let response = client
            .list(token, resource, &query_from_map(&params))
            .await?;

        let items = match response {
            Value::Object(mut obj) => match obj.remove("data") {
                Some(Value::Array(items)) => items,
                _ => break,
            },
            Value::Array(items) => items,
            _ => break,
        };

        let count = items.len();
        out.extend(items);
        if count < show {
            break;
        }
    }

    tracing::debug!("Fetched {} {} records", out.len(), resource);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_clamped() {
        let bounds = PageBounds::new(0, 0);
        assert_eq!(bounds.page_size(), 1);
        assert_eq!(bounds.max_pages(), 1);

        let bounds = PageBounds::new(1000, 99);
        assert_eq!(bounds.page_size(), 200);
        assert_eq!(bounds.max_pages(), 20);
    }

    #[test]
    fn test_bounds_from_options() {
        let defaults = PageBounds::new(200, 5);

        assert_eq!(PageBounds::from_options(None, None, defaults), defaults);
        assert_eq!(
            PageBounds::from_options(Some(50), Some(-3), defaults),
            PageBounds::new(50, 1)
        );
        assert_eq!(
            PageBounds::from_options(Some(500), Some(40), defaults),
            PageBounds::new(200, 20)
        );
    }
}
