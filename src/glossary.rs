//! Glossary based term protection.
//!
//! A glossary file is UTF-8 text made of paragraphs separated by a blank
//! line. A paragraph with one line protects a term from translation, a
//! paragraph with two lines swaps the first line for the second. Longer
//! paragraphs are ignored.
//!
//! Before a text is sent to the translation backend every source term is
//! replaced by a placeholder token owned by its rule; after translation
//! the placeholders are swapped back for the replacement terms.

use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, TranslatorError};

/// One protected term and what it becomes after translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryRule {
    pub source: String,
    pub replacement: String,
    placeholder: String,
}

impl GlossaryRule {
    fn new(source: String, replacement: String) -> Self {
        Self {
            source,
            replacement,
            placeholder: format!("__glossary_id_{}__", Uuid::new_v4().simple()),
        }
    }

    /// Token standing in for the source term while the text is translated
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_protect_only(&self) -> bool {
        self.source == self.replacement
    }
}

/// Piece of a text being substituted
enum Segment<'a> {
    Text(String),
    Placeholder(&'a str),
}

#[derive(Debug, Clone, Default)]
pub struct Glossary {
    rules: Vec<GlossaryRule>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from a glossary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TranslatorError::GlossaryFile {
            path: path.to_path_buf(),
            source,
        })?;

        let glossary = Self::parse(&content);
        info!("Loaded {} glossary rules from {}", glossary.len(), path.display());
        Ok(glossary)
    }

    /// Build rules from glossary file content
    pub fn parse(content: &str) -> Self {
        let mut glossary = Self::new();
        let content = content.replace("\r\n", "\n");
        let content = content.trim();

        if content.is_empty() {
            return glossary;
        }

        for group in content.split("\n\n") {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }

            let lines: Vec<&str> = group.split('\n').collect();
            match lines.as_slice() {
                [term] => glossary.push(term, term),
                [term, replacement] => glossary.push(term, replacement),
                _ => debug!("Skipping glossary group with {} lines: {:?}", lines.len(), group),
            }
        }

        glossary
    }

    fn push(&mut self, source: &str, replacement: &str) {
        self.rules.push(GlossaryRule::new(source.to_string(), replacement.to_string()));
    }

    pub fn rules(&self) -> &[GlossaryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Swap every source term for its rule's placeholder.
    ///
    /// Rules apply in load order, and a rule only matches text outside the
    /// placeholders inserted by earlier rules.
    pub fn replace(&self, text: &str) -> String {
        let mut segments = vec![Segment::Text(text.to_string())];

        for rule in self.rules.iter().filter(|rule| !rule.source.is_empty()) {
            segments = segments
                .into_iter()
                .flat_map(move |segment| match segment {
                    Segment::Text(text) if text.contains(rule.source.as_str()) => {
                        let mut parts = Vec::new();
                        for (i, part) in text.split(rule.source.as_str()).enumerate() {
                            if i > 0 {
                                parts.push(Segment::Placeholder(rule.placeholder.as_str()));
                            }
                            if !part.is_empty() {
                                parts.push(Segment::Text(part.to_string()));
                            }
                        }
                        parts
                    }
                    other => vec![other],
                })
                .collect();
        }

        segments
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(text) => text,
                Segment::Placeholder(placeholder) => placeholder.to_string(),
            })
            .collect()
    }

    /// Swap every placeholder for its rule's replacement term
    pub fn restore(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |text, rule| {
            text.replace(&rule.placeholder, &rule.replacement)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_swap_and_protect() {
        let glossary = Glossary::parse("Alice\nAli\n\nBob");
        assert_eq!(glossary.len(), 2);
        assert!(!glossary.rules()[0].is_protect_only());
        assert!(glossary.rules()[1].is_protect_only());

        let replaced = glossary.replace("Alice met Bob");
        assert!(!replaced.contains("Alice"));
        assert!(!replaced.contains("Bob"));
        assert_eq!(glossary.restore(&replaced), "Ali met Bob");
    }

    #[test]
    fn test_restore_after_surrounding_text_changes() {
        let glossary = Glossary::parse("Rust\n\nCargo.toml\nmanifest");
        let replaced = glossary.replace("Rust reads Cargo.toml. Rust!");
        let translated = format!("[de] {}", replaced.to_uppercase().replace("READS", "liest"));
        // Placeholders are case sensitive, so only an untouched token restores.
        let untouched = format!("[de] {}", replaced.replace("reads", "liest"));

        assert_ne!(glossary.restore(&translated), "[de] Rust liest manifest. Rust!");
        assert_eq!(glossary.restore(&untouched), "[de] Rust liest manifest. Rust!");
    }

    #[test]
    fn test_placeholders_are_unique() {
        let glossary = Glossary::parse("a\n\nb\n\nc\nd\n\na");
        let placeholders: HashSet<&str> = glossary.rules().iter().map(|r| r.placeholder()).collect();
        assert_eq!(placeholders.len(), glossary.len());

        for rule in glossary.rules() {
            assert!(rule.placeholder().starts_with("__glossary_id_"));
            assert!(rule.placeholder().ends_with("__"));
        }
    }

    #[test]
    fn test_earlier_rule_wins_on_overlap() {
        let glossary = Glossary::parse("New York\nNYC\n\nYork\nEboracum");
        let text = glossary.restore(&glossary.replace("New York is not York"));
        assert_eq!(text, "NYC is not Eboracum");

        let reversed = Glossary::parse("York\nEboracum\n\nNew York\nNYC");
        let text = reversed.restore(&reversed.replace("New York is not York"));
        assert_eq!(text, "New Eboracum is not Eboracum");
    }

    #[test]
    fn test_later_rules_leave_placeholders_intact() {
        let glossary = Glossary::parse("Alice\nAli\n\nid");
        let replaced = glossary.replace("Alice has an id");
        assert_eq!(replaced.matches("__glossary_id_").count(), 2);
        assert_eq!(glossary.restore(&replaced), "Ali has an id");

        let glossary = Glossary::parse("Bob\n\n_");
        assert_eq!(glossary.restore(&glossary.replace("Bob snake_case")), "Bob snake_case");

        let glossary = Glossary::parse("Rust\n\nglossary\n\na\n\n1");
        let text = "Rust glossary a1";
        let replaced = glossary.replace(text);
        assert!(!replaced.contains("Rust"));
        assert_eq!(glossary.restore(&replaced), text);
    }

    #[test]
    fn test_malformed_and_empty_groups_are_skipped() {
        let glossary = Glossary::parse("one\ntwo\nthree\n\n\n\nkeep\nkept\r\n\r\nsolo\n");
        let sources: Vec<&str> = glossary.rules().iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["keep", "solo"]);
        assert_eq!(glossary.rules()[0].replacement, "kept");
    }

    #[test]
    fn test_empty_content() {
        assert!(Glossary::parse("").is_empty());
        assert!(Glossary::parse("  \n\n \n").is_empty());

        let glossary = Glossary::new();
        assert_eq!(glossary.restore(&glossary.replace("unchanged")), "unchanged");
    }

    #[test]
    fn test_load_from_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("glossary.txt");
        file.write_str("Alice\nAli\n\nBob\n").unwrap();

        let glossary = Glossary::load(file.path()).unwrap();
        assert_eq!(glossary.len(), 2);
        assert_eq!(glossary.restore(&glossary.replace("Alice met Bob")), "Ali met Bob");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Glossary::load(temp.child("missing.txt").path());
        assert!(matches!(result, Err(TranslatorError::GlossaryFile { .. })));
    }
}
