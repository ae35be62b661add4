//! Domain-specific assertion macros for feedtest harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* request or list was wrong.

// ---------------------------------------------------------------------------
// Request assertions
// ---------------------------------------------------------------------------

/// Assert method and path of a [`RecordedRequest`](super::RecordedRequest),
/// and optionally its query string.
///
/// ```rust
/// assert_request!(req, "GET", "/services/feeds/api/V1/notifications", Some("rev=1"));
/// ```
#[macro_export]
macro_rules! assert_request {
    ($req:expr, $method:expr, $path:expr) => {{
        let req = &$req;
        if req.method != $method || req.path != $path {
            panic!(
                "assert_request! failed:\n  expected: {} {}\n  actual:   {} {}?{:?}",
                $method, $path, req.method, req.path, req.query
            );
        }
    }};
    ($req:expr, $method:expr, $path:expr, $query:expr) => {{
        let req = &$req;
        $crate::assert_request!(req, $method, $path);
        let expected: Option<&str> = $query;
        pretty_assertions::assert_eq!(req.query.as_deref(), expected, "query string of {}", req.path);
    }};
}

// ---------------------------------------------------------------------------
// List assertions
// ---------------------------------------------------------------------------

/// Assert the ids of a slice of anything with an `id: String` field, in order.
///
/// ```rust
/// assert_ids!(controller.user().items, ["n2", "n1"]);
/// ```
#[macro_export]
macro_rules! assert_ids {
    ($items:expr, [$($id:expr),* $(,)?]) => {{
        let actual: Vec<&str> = $items.iter().map(|i| i.id.as_str()).collect();
        let expected: Vec<&str> = vec![$($id),*];
        if actual != expected {
            panic!(
                "assert_ids! failed:\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            );
        }
    }};
}

/// Assert that `needle` occurs exactly `n` times in `haystack`.
#[macro_export]
macro_rules! assert_occurs {
    ($haystack:expr, $needle:expr, $n:expr) => {{
        let haystack: &str = &$haystack;
        let count = haystack.matches($needle).count();
        if count != $n {
            panic!(
                "assert_occurs! failed: {:?} occurs {} times, expected {}\n--- text ---\n{}",
                $needle, count, $n, haystack
            );
        }
    }};
}
