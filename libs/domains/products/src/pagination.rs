//! Page-number pagination for the product listing.
//!
//! `page_size` picks the number of results per page and `page` the 1-based
//! page. Links to neighbouring pages keep every other query parameter.

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductPage};

pub const DEFAULT_PAGE_SIZE: u64 = 5;
pub const MAX_PAGE_SIZE: u64 = 100;

const PAGE_PARAM: &str = "page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Positive sizes are clamped to [`MAX_PAGE_SIZE`]; anything else falls back
/// to [`DEFAULT_PAGE_SIZE`].
fn parse_page_size(raw: Option<&str>) -> u64 {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(size) if size > 0 => (size as u64).min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

impl PageRequest {
    /// Builds a request from raw query values.
    ///
    /// A missing or empty `page` means the first page; a `page` that is not a
    /// positive integer is an invalid page.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> ProductResult<Self> {
        let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(ProductError::InvalidPage),
            },
        };

        Ok(Self {
            page,
            page_size: parse_page_size(page_size),
        })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    /// Number of pages for `count` results; an empty listing still has one page.
    pub fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.page_size).max(1)
    }

    pub fn has_next(&self, count: u64) -> bool {
        self.page < self.num_pages(count)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Link to `page` of the same listing, relative to the request path.
///
/// The first page is linked without a `page` parameter.
pub fn page_link(path: &str, query: Option<&str>, page: u64) -> String {
    let mut pairs: Vec<String> = query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(PAGE_PARAM))
        .map(str::to_string)
        .collect();

    if page > 1 {
        pairs.push(format!("{}={}", PAGE_PARAM, page));
    }

    if pairs.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, pairs.join("&"))
    }
}

impl ProductPage {
    pub fn new(
        count: u64,
        results: Vec<Product>,
        request: PageRequest,
        path: &str,
        query: Option<&str>,
    ) -> Self {
        let next = request
            .has_next(count)
            .then(|| page_link(path, query, request.page + 1));
        let previous = request
            .has_previous()
            .then(|| page_link(path, query, request.page - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_defaults_and_clamps() {
        let parse = |raw| PageRequest::from_query(None, raw).unwrap().page_size;

        assert_eq!(parse(None), 5);
        assert_eq!(parse(Some("20")), 20);
        assert_eq!(parse(Some("1000")), 100);
        assert_eq!(parse(Some("0")), 5);
        assert_eq!(parse(Some("-3")), 5);
        assert_eq!(parse(Some("lots")), 5);
    }

    #[test]
    fn test_page_parsing() {
        assert_eq!(PageRequest::from_query(None, None).unwrap().page, 1);
        assert_eq!(PageRequest::from_query(Some(""), None).unwrap().page, 1);
        assert_eq!(PageRequest::from_query(Some("3"), None).unwrap().page, 3);
        assert!(matches!(
            PageRequest::from_query(Some("0"), None),
            Err(ProductError::InvalidPage)
        ));
        assert!(matches!(
            PageRequest::from_query(Some("two"), None),
            Err(ProductError::InvalidPage)
        ));
    }

    #[test]
    fn test_page_arithmetic() {
        let request = PageRequest {
            page: 2,
            page_size: 5,
        };
        assert_eq!(request.offset(), 5);
        assert_eq!(request.num_pages(11), 3);
        assert!(request.has_next(11));
        assert!(!request.has_next(10));
        assert!(request.has_previous());
        assert_eq!(PageRequest::default().num_pages(0), 1);
    }

    #[test]
    fn test_page_link_replaces_page_param() {
        assert_eq!(
            page_link("/products/", Some("name=kettle&page=2&page_size=10"), 3),
            "/products/?name=kettle&page_size=10&page=3"
        );
        assert_eq!(
            page_link("/products/", Some("page=2&category=tools"), 1),
            "/products/?category=tools"
        );
        assert_eq!(page_link("/products/", None, 1), "/products/");
    }

    #[test]
    fn test_product_page_links() {
        let request = PageRequest {
            page: 2,
            page_size: 1,
        };
        let page = ProductPage::new(3, vec![], request, "/products/", Some("page=2&page_size=1"));

        assert_eq!(page.count, 3);
        assert_eq!(page.next.as_deref(), Some("/products/?page_size=1&page=3"));
        assert_eq!(page.previous.as_deref(), Some("/products/?page_size=1"));
    }
}
