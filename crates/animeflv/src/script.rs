//! Tolerant extraction of JSON literals embedded in inline scripts.
//!
//! The site ships page data as `var name = [...];` / `var name = {...};`
//! assignments inside `<script>` blocks. Extraction is deliberately
//! fail-soft: any missing marker, truncated literal, or JSON parse
//! failure yields `None` instead of an error, so a malformed page
//! degrades to default field values upstream.

use regex::Regex;
use scraper::{Html, Selector};

/// Find the first inline script whose text contains `var <name>`.
fn script_containing(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse("script").ok()?;
    let marker = format!("var {}", name);
    document
        .select(&selector)
        .map(|script| script.text().collect::<String>())
        .find(|text| text.contains(&marker))
}

/// Extract and parse the literal assigned to `var <name>`, where the
/// literal opens with `open` and runs (non-greedily) to the first
/// `<close>;`.
fn extract_literal(
    document: &Html,
    name: &str,
    open: char,
    close: char,
) -> Option<serde_json::Value> {
    let text = script_containing(document, name)?;
    let pattern = format!(
        r"(?s)var {}\s*=\s*(\{}.*?\{});",
        regex::escape(name),
        open,
        close
    );
    let re = Regex::new(&pattern).ok()?;
    let literal = re.captures(&text)?.get(1)?.as_str();
    match serde_json::from_str(literal) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Malformed embedded blob for var {}: {}", name, e);
            None
        }
    }
}

/// Extract a JSON array assigned to `var <name>` (`var x = [...];`).
pub(crate) fn find_script_array(document: &Html, name: &str) -> Option<serde_json::Value> {
    extract_literal(document, name, '[', ']')
}

/// Extract a JSON object assigned to `var <name>` (`var x = {...};`).
pub(crate) fn find_script_object(document: &Html, name: &str) -> Option<serde_json::Value> {
    extract_literal(document, name, '{', '}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_extracts_array() {
        let document = doc(
            r#"<script>var anime_info = ["101", "Title", "slug", "2025-04-01"];
               var episodes = [[12, 900], [11, 899]];</script>"#,
        );

        let info = find_script_array(&document, "anime_info").unwrap();
        assert_eq!(info[3], "2025-04-01");

        let episodes = find_script_array(&document, "episodes").unwrap();
        assert_eq!(episodes.as_array().unwrap().len(), 2);
        assert_eq!(episodes[0][0], 12);
    }

    #[test]
    fn test_extracts_object_up_to_first_close() {
        let document = doc(
            r#"<script>var videos = {"SUB": [{"server": "MEGA", "url": "https://mega.nz/x"}]};
               var other = {"k": 1};</script>"#,
        );

        let videos = find_script_object(&document, "videos").unwrap();
        assert!(videos.get("SUB").is_some());
        assert!(videos.get("k").is_none());
    }

    #[test]
    fn test_missing_marker_is_none() {
        let document = doc("<script>var unrelated = [1];</script>");
        assert!(find_script_array(&document, "episodes").is_none());
    }

    #[test]
    fn test_malformed_json_is_none() {
        let document = doc("<script>var episodes = [[1, 2,];</script>");
        assert!(find_script_array(&document, "episodes").is_none());
    }

    #[test]
    fn test_no_scripts_is_none() {
        let document = doc("<p>nothing here</p>");
        assert!(find_script_object(&document, "videos").is_none());
    }
}
