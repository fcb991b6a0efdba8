use crate::error::ApiError;
use serde_json::Value;
use tracing::warn;

/// One decoded page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub items: Vec<Value>,
    /// `meta.total_pages` when the API reports it.
    pub total_pages: Option<u32>,
}

/// Longest body excerpt carried by [`ApiError::UnexpectedLayout`].
pub const BODY_EXCERPT_LIMIT: usize = 512;

/// Extracts result items from any of the response layouts the API has used:
///
/// - `{"results": {"campgrounds": [...]}, "meta": {...}}`
/// - `{"campgrounds": [...], "meta": {...}}`
/// - `{"data": [...], "meta": {...}}`
/// - a bare JSON array
///
/// An empty array under a known key is a real empty page. Anything else is an
/// [`ApiError::UnexpectedLayout`] carrying the start of the body, so a blocked
/// or changed endpoint never reads as an exhausted cell.
pub fn parse_search_response(body: Value, page: u32) -> Result<SearchPage, ApiError> {
    match body {
        Value::Array(items) => Ok(SearchPage {
            items,
            total_pages: None,
        }),
        Value::Object(mut map) => {
            let total_pages = map
                .get("meta")
                .and_then(|meta| meta.get("total_pages"))
                .and_then(Value::as_u64)
                .map(|n| n.min(u32::MAX as u64) as u32);

            let items = if let Some(Value::Array(items)) = map
                .get_mut("results")
                .and_then(|results| results.get_mut("campgrounds"))
            {
                std::mem::take(items)
            } else if let Some(Value::Array(items)) = map.get_mut("campgrounds") {
                std::mem::take(items)
            } else if let Some(Value::Array(items)) = map.get_mut("data") {
                std::mem::take(items)
            } else {
                let keys: Vec<&String> = map.keys().collect();
                warn!(page, ?keys, "Unexpected search response format");
                return Err(unexpected(page, &Value::Object(map)));
            };

            Ok(SearchPage { items, total_pages })
        }
        other => {
            warn!(page, kind = %json_kind(&other), "Search response is not an object or array");
            Err(unexpected(page, &other))
        }
    }
}

fn unexpected(page: u32, body: &Value) -> ApiError {
    let text = body.to_string();
    let body = match text.char_indices().nth(BODY_EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    };
    ApiError::UnexpectedLayout { page, body }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_results_layout() {
        let page = parse_search_response(
            json!({"results": {"campgrounds": [{"id": "1"}, {"id": "2"}]}, "meta": {"total_pages": 4}}),
            1,
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, Some(4));
    }

    #[test]
    fn flat_campgrounds_layout() {
        let page = parse_search_response(json!({"campgrounds": [{"id": "1"}]}), 1).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, None);
    }

    #[test]
    fn data_layout() {
        let page =
            parse_search_response(json!({"data": [{"id": "1"}], "meta": {"total_pages": 1}}), 2)
                .unwrap();
        assert_eq!(page.items, vec![json!({"id": "1"})]);
        assert_eq!(page.total_pages, Some(1));
    }

    #[test]
    fn bare_array_layout() {
        let page = parse_search_response(json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]), 1).unwrap();
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn known_key_with_no_items_is_an_empty_page() {
        let page = parse_search_response(json!({"campgrounds": [], "meta": {"total_pages": 0}}), 3)
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(parse_search_response(json!([]), 1).unwrap(), SearchPage::default());
    }

    #[test]
    fn unknown_layout_is_an_error_with_the_body() {
        match parse_search_response(json!({"error": "temporarily blocked"}), 2) {
            Err(ApiError::UnexpectedLayout { page, body }) => {
                assert_eq!(page, 2);
                assert!(body.contains("temporarily blocked"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(matches!(
            parse_search_response(json!("text"), 1),
            Err(ApiError::UnexpectedLayout { .. })
        ));
        assert!(matches!(
            parse_search_response(json!({"campgrounds": "none"}), 1),
            Err(ApiError::UnexpectedLayout { .. })
        ));
    }

    #[test]
    fn long_bodies_are_cut() {
        let noise = "x".repeat(BODY_EXCERPT_LIMIT * 4);
        let Err(ApiError::UnexpectedLayout { body, .. }) =
            parse_search_response(json!({ "html": noise }), 1)
        else {
            panic!("expected an unexpected-layout error");
        };
        assert_eq!(body.chars().count(), BODY_EXCERPT_LIMIT + 3);
        assert!(body.ends_with("..."));
    }
}
