use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

/// Parses a CSS selector, turning the parser's borrowed error into an owned one.
pub fn parse_selector(css_selector: &str) -> Result<Selector> {
    Selector::parse(css_selector)
        .map_err(|why| anyhow!("Failed to Selector::parse({}) because: {:?}", css_selector, why))
}

/// Returns the text of every element matched by `selector`, concatenated in
/// document order and trimmed of surrounding whitespace.
///
/// No match yields an empty string rather than an error; callers treat empty
/// fields as an incomplete extraction.
///
/// # Example
///
/// ```
/// let document = Html::parse_document(r#"<div class="name"> Apple Inc. </div>"#);
/// let selector = parse_selector("div.name").unwrap();
/// assert_eq!(child_text(&document, &selector), "Apple Inc.");
/// ```
pub fn child_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .flat_map(|element| element.text())
        .collect::<String>()
        .trim()
        .to_string()
}
