//! Icon and title lookup in homepage HTML.

use scraper::{Html, Selector};

/// `href` of the first `<link>` whose `rel` mentions "icon".
///
/// Matches `icon`, `shortcut icon`, `apple-touch-icon` and similar. Links
/// without an `href` are skipped. The value is returned as written, relative
/// or absolute.
pub fn extract_icon(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("link[rel]").ok()?;

    document
        .select(&selector)
        .filter(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_ascii_lowercase().contains("icon"))
        })
        .find_map(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Text of the first `<title>`, whitespace collapsed. Empty titles are `None`.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    let title = document.select(&selector).next()?;
    let text = title.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_icon_first_match() {
        let html = r#"
            <html><head>
                <link rel="stylesheet" href="/main.css">
                <link rel="shortcut icon" href="/favicon.ico">
                <link rel="apple-touch-icon" href="/touch.png">
            </head></html>
        "#;
        assert_eq!(extract_icon(html).as_deref(), Some("/favicon.ico"));
    }

    #[test]
    fn test_extract_icon_skips_link_without_href() {
        let html = r#"<head><link rel="icon"><link rel="ICON" href="https://cdn.example.com/i.png"></head>"#;
        assert_eq!(extract_icon(html).as_deref(), Some("https://cdn.example.com/i.png"));
    }

    #[test]
    fn test_extract_icon_in_body() {
        let html = r#"<html><body><link rel="icon" href="/late.ico"></body></html>"#;
        assert_eq!(extract_icon(html).as_deref(), Some("/late.ico"));
    }

    #[test]
    fn test_extract_icon_none() {
        assert_eq!(extract_icon("<html><head><title>x</title></head></html>"), None);
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>\n  Example   Domain\n</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Example Domain"));
    }

    #[test]
    fn test_extract_title_first_only() {
        let html = "<title>First</title><svg><title>Second</title></svg>";
        assert_eq!(extract_title(html).as_deref(), Some("First"));
    }

    #[test]
    fn test_extract_title_missing_or_empty() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }
}
