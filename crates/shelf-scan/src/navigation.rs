//! Navigation targets and the navigator seam.
//!
//! The engine only ever leaves a dialog in two directions: to a product page
//! or to the manual search with the scanned barcode as the query.

use std::fmt;

use shelf_core::ProductId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    Product(ProductId),
    Search { query: String },
}

impl NavigationTarget {
    /// Application route for this target.
    pub fn route(&self) -> String {
        match self {
            NavigationTarget::Product(id) => format!("/product/{}", id),
            NavigationTarget::Search { query } => format!("/search?q={}", urlencoding::encode(query)),
        }
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.route())
    }
}

/// Host routing. Fire-and-forget: the engine never waits on it.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavigationTarget);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_route() {
        assert_eq!(NavigationTarget::Product(ProductId::new(42)).route(), "/product/42");
    }

    #[test]
    fn test_search_route() {
        let target = NavigationTarget::Search {
            query: "036000291452".into(),
        };
        assert_eq!(target.route(), "/search?q=036000291452");
        assert_eq!(target.to_string(), "/search?q=036000291452");
    }

    #[test]
    fn test_search_query_is_encoded() {
        let target = NavigationTarget::Search {
            query: "a b&c".into(),
        };
        assert_eq!(target.route(), "/search?q=a%20b%26c");
    }

    #[test]
    fn test_search_query_keeps_unreserved() {
        let target = NavigationTarget::Search {
            query: "ABC-123_x.y~z/é".into(),
        };
        assert_eq!(target.route(), "/search?q=ABC-123_x.y~z%2F%C3%A9");
    }
}
