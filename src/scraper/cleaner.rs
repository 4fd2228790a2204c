use scraper::ElementRef;

// ── Text helpers ──────────────────────────────────────────────────────────────

/// Visible text of an element with runs of whitespace collapsed.
/// "  Lee\n   Sang-hyeok " → "Lee Sang-hyeok"
pub fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `None` for empty / whitespace-only strings, trimmed otherwise.
pub fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Attribute value, trimmed, ignoring empty values.
pub fn attr(el: &ElementRef<'_>, name: &str) -> Option<String> {
    el.value().attr(name).and_then(non_empty)
}

/// First sibling after `el` that is an element (text nodes are skipped).
pub fn next_element_sibling<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Lee\n   Sang-hyeok "), "Lee Sang-hyeok");
        assert_eq!(collapse_whitespace("\t\n"), "");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  Mid "), Some("Mid".to_string()));
        assert_eq!(non_empty("   "), None);
    }

    #[test]
    fn next_sibling_skips_text_nodes() {
        let doc = Html::parse_fragment("<div><span>Name:</span>\n  <b>Faker</b></div>");
        let sel = Selector::parse("span").unwrap();
        let label = doc.select(&sel).next().unwrap();
        let value = next_element_sibling(&label).unwrap();
        assert_eq!(value.value().name(), "b");
        assert_eq!(element_text(&value), "Faker");
    }
}
