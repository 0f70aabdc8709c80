//! Embedded-script probe
//!
//! Some DLB page revisions ship result data inside inline scripts. Nothing
//! stable enough to map onto draws has been seen there yet, so this strategy
//! only reports what it finds.

use super::Strategy;
use crate::DrawRecord;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{[^{}]*lottery[^{}]*\}").unwrap());

pub struct ScriptStrategy;

impl ScriptStrategy {
    /// JSON objects mentioning a lottery inside the page's inline scripts
    pub fn find_objects(&self, document: &Html) -> Vec<serde_json::Value> {
        let script_selector = Selector::parse("script").unwrap();
        let mut found = Vec::new();

        for script in document.select(&script_selector) {
            let source: String = script.text().collect();
            for candidate in JSON_OBJECT.find_iter(&source) {
                match serde_json::from_str::<serde_json::Value>(candidate.as_str()) {
                    Ok(value) => found.push(value),
                    Err(e) => log::debug!("Skipping script fragment: {}", e),
                }
            }
        }

        found
    }
}

impl Strategy for ScriptStrategy {
    fn name(&self) -> &'static str {
        "script"
    }

    fn try_extract(&self, document: &Html) -> Vec<DrawRecord> {
        for value in self.find_objects(document) {
            log::debug!("Found lottery data in script: {}", value);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
        <script>
          var results = [{"lottery": "SASIRI", "draw": 4412}, {lottery: broken}];
        </script>
        <script>console.log("no data");</script>
        </head><body></body></html>
    "#;

    #[test]
    fn test_finds_json_objects() {
        let objects = ScriptStrategy.find_objects(&Html::parse_document(PAGE));
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["lottery"], "SASIRI");
        assert_eq!(objects[0]["draw"], 4412);
    }

    #[test]
    fn test_never_yields_records() {
        assert!(ScriptStrategy
            .try_extract(&Html::parse_document(PAGE))
            .is_empty());
    }
}
