//! Symbol-type classification from markup hints
//!
//! Both boards render result balls as styled elements. The CSS classes and
//! `title` attributes are the only reliable signal of a ball's role, so they
//! take priority over the shape of the text. Tokens with no usable hint fall
//! back to [`classify_bare`].

use crate::SymbolType;
use regex::Regex;
use std::sync::LazyLock;

static SINGLE_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]$").unwrap());
static SMALL_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}$").unwrap());

/// Markup hints carried by a result element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    pub classes: Vec<String>,
    pub title: Option<String>,
}

impl Hints {
    pub fn new<I, S>(classes: I, title: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Hints {
            classes: classes.into_iter().map(Into::into).collect(),
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    /// Hints read from an element's `class` and `title` attributes
    pub fn from_element(element: &scraper::ElementRef) -> Self {
        Hints::new(element.value().classes(), element.value().attr("title"))
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    fn title_is(&self, name: &str) -> bool {
        self.title
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }

    fn any_class(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.classes.iter().any(|c| pred(&c.to_lowercase()))
    }

    /// Pagination / "More" controls rendered inside a ball list
    pub fn is_more_control(&self) -> bool {
        self.has_class("More")
    }

    fn says_letter(&self) -> bool {
        self.title_is("Letter") || self.any_class(|c| c == "letter" || c.ends_with("_letter"))
    }

    fn says_zodiac(&self) -> bool {
        self.title_is("Zodiac") || self.any_class(|c| c.contains("zodiac"))
    }

    fn says_super(&self) -> bool {
        self.title_is("Super Number") || (self.has_class("Circle") && self.has_class("Red"))
    }

    fn says_promotional(&self) -> bool {
        self.any_class(|c| c.contains("number-1")) && self.has_class("Square")
    }
}

/// Assign a symbol type to a trimmed, non-empty token.
///
/// Hint checks run in a fixed order (letter, zodiac, super, promotional) so that
/// overlapping signals always resolve the same way.
pub fn classify(text: &str, hints: &Hints) -> SymbolType {
    if hints.says_letter() {
        SymbolType::Letter
    } else if hints.says_zodiac() {
        SymbolType::Zodiac
    } else if hints.says_super() {
        SymbolType::Super
    } else if hints.says_promotional() {
        SymbolType::Promotional
    } else {
        classify_bare(text)
    }
}

/// Context-free classification from the token's shape alone
pub fn classify_bare(text: &str) -> SymbolType {
    let text = text.trim();
    if SINGLE_LETTER.is_match(text) {
        SymbolType::Letter
    } else if SMALL_NUMBER.is_match(text) {
        SymbolType::Number
    } else if text.chars().count() > 2 {
        // Zodiac sign names are the only long free-text tokens either board emits
        SymbolType::Zodiac
    } else {
        SymbolType::Number
    }
}
