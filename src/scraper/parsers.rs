use crate::error::ExtractionError;
use crate::models::RawPayload;
use scraper::{Html, Selector};
use tracing::debug;

// ── Embedded state ────────────────────────────────────────────────────────────

/// Decode the state JSON injected into one of the page's `<script>` elements.
///
/// The script is found by its `marker` prefix, wherever it sits in the document.
/// A page without the marker is an error, never an empty result: "nothing sold"
/// and "the page layout changed" must stay distinguishable.
pub fn parse_state_payload(html: &str, marker: &str) -> Result<RawPayload, ExtractionError> {
    let body = find_state_script(html, marker).ok_or_else(|| ExtractionError::MissingMarker {
        marker: marker.to_string(),
    })?;

    let json = body.trim_end().trim_end_matches(';');
    let payload: RawPayload = serde_json::from_str(json)?;

    debug!(
        "State payload: {} results, {} properties, page {}/{}",
        payload.results.result_count,
        payload.results.properties.len(),
        payload.pagination.current,
        payload.pagination.last,
    );
    Ok(payload)
}

/// Text of the first script whose content starts with `marker`, minus the marker.
fn find_state_script(html: &str, marker: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let Ok(script_sel) = Selector::parse("script") else { return None };

    doc.select(&script_sel)
        .map(|el| el.text().collect::<String>())
        .find_map(|text| text.trim_start().strip_prefix(marker).map(str::to_string))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_state_marker;

    fn page(scripts: &[&str]) -> String {
        let tags: String = scripts.iter().map(|s| format!("<script>{}</script>", s)).collect();
        format!("<html><head>{}</head><body><h1>Sold prices</h1></body></html>", tags)
    }

    const STATE: &str = r#"{
        "results": {
            "resultCount": "1,204",
            "properties": [
                {
                    "address": "1 High Street, Bath",
                    "propertyType": "Terraced",
                    "transactions": [
                        {"displayPrice": "&pound;450,000", "dateSold": "4 Nov 2020", "tenure": "FREEHOLD"}
                    ]
                }
            ]
        },
        "pagination": {"current": 1, "first": 1, "last": 3, "next": 2}
    }"#;

    #[test]
    fn test_marker_found_regardless_of_position() {
        let marker = default_state_marker();
        let state = format!("{}{}", marker, STATE);
        let html = page(&["var analytics = {};", "window.dataLayer = [];", &state]);

        let payload = parse_state_payload(&html, &marker).unwrap();
        assert_eq!(payload.results.result_count, 1204);
        assert_eq!(payload.results.properties.len(), 1);
        assert_eq!(payload.results.properties[0].transactions[0].display_price, "&pound;450,000");
        assert_eq!((payload.pagination.current, payload.pagination.first, payload.pagination.last), (1, 1, 3));
    }

    #[test]
    fn test_trailing_semicolon_and_whitespace() {
        let marker = default_state_marker();
        let state = format!("\n  {}{};\n", marker, STATE);
        let html = page(&[&state]);
        assert!(parse_state_payload(&html, &marker).is_ok());
    }

    #[test]
    fn test_missing_marker() {
        let html = page(&["var analytics = {};", "window.__OTHER_STATE__ = {}"]);
        let err = parse_state_payload(&html, &default_state_marker()).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingMarker { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let marker = default_state_marker();
        let html = page(&[&format!("{}{{\"results\": ", marker)]);
        let err = parse_state_payload(&html, &marker).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedJson(_)));
    }

    #[test]
    fn test_json_missing_required_keys_is_malformed() {
        let marker = default_state_marker();
        let html = page(&[&format!("{}{{\"results\": {{\"resultCount\": 0}}}}", marker)]);
        let err = parse_state_payload(&html, &marker).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedJson(_)));
    }
}
