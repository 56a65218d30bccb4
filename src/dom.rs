//! Element tree queries
//!
//! Thin layer over the scraper crate: parse a block's markup, locate the
//! block element, and read attributes or text from elements.

use scraper::{ElementRef, Html, Selector};

/// Parse a block's markup as an HTML fragment.
pub fn parse_block(html: &str) -> Html {
    Html::parse_fragment(html)
}

/// First element of a parsed fragment, i.e. the block element itself
pub fn block_element(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment
        .root_element()
        .children()
        .find_map(ElementRef::wrap)
}

/// First descendant of `element` matching `selector`.
pub fn first_match<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// All descendants of `element` matching `selector`, in document order.
pub fn all_matches<'a>(element: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    element.select(selector).collect()
}

/// Descendant text concatenated without separators, then trimmed.
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Named attribute, or the element's text content when the attribute is absent.
pub fn attr_or_text(element: ElementRef<'_>, name: &str) -> String {
    match element.value().attr(name) {
        Some(value) => value.to_string(),
        None => text_content(element),
    }
}
