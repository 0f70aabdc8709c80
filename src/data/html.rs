//! Small helpers over `scraper` element trees

use regex::Regex;
use scraper::{ElementRef, Html, Node};

/// True if any individual class of the element matches the pattern
pub fn class_matches(element: &ElementRef, pattern: &Regex) -> bool {
    element.value().classes().any(|c| pattern.is_match(c))
}

/// Element text with text nodes joined by spaces and whitespace collapsed
pub fn text_of(element: &ElementRef) -> String {
    collapse(element.text())
}

/// Visible text of the whole document, skipping script and style contents
pub fn visible_text(document: &Html) -> String {
    let texts = document.root_element().descendants().filter_map(|node| {
        let text = match node.value() {
            Node::Text(text) => text,
            _ => return None,
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name().to_string()))
            .map(|name| name == "script" || name == "style")
            .unwrap_or(false);
        if hidden {
            None
        } else {
            Some(&**text)
        }
    });
    collapse(texts)
}

/// Does the element contain a descendant (not itself) with the given tag
pub fn has_descendant(element: &ElementRef, tag: &str) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|e| e.value().name() == tag)
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
