//! Plain text documents whose paragraphs are translated one by one and
//! rendered as an XHTML fragment next to (or instead of) the original.

use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::translate::common::{escape_attribute, escape_xml};
use crate::translate::{Fragment, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Already XML escaped
    pub text: String,
    pub lang: String,
    pub position: Position,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub original: String,
    pub translation: Option<Translation>,
}

impl Paragraph {
    pub fn new(original: &str) -> Self {
        Self {
            original: original.to_string(),
            translation: None,
        }
    }

    fn render(&self, out: &mut String) {
        let original = format!("<p>{}</p>\n", escape_xml(&self.original));

        let Some(translation) = &self.translation else {
            out.push_str(&original);
            return;
        };

        let style = translation
            .color
            .as_ref()
            .map(|color| format!(" style=\"color:{}\"", escape_attribute(color)))
            .unwrap_or_default();
        let translated = format!(
            "<p lang=\"{}\"{}>{}</p>\n",
            escape_attribute(&translation.lang),
            style,
            translation.text
        );

        match translation.position {
            Position::After => {
                out.push_str(&original);
                out.push_str(&translated);
            }
            Position::Before => {
                out.push_str(&translated);
                out.push_str(&original);
            }
            Position::Only => out.push_str(&translated),
        }
    }
}

impl Fragment for Paragraph {
    fn content(&self) -> String {
        self.original.clone()
    }

    fn inject(&mut self, translation: &str, target_code: &str, position: Position, color: Option<&str>) {
        self.translation = Some(Translation {
            text: translation.to_string(),
            lang: target_code.to_string(),
            position,
            color: color.map(str::to_string),
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    pub paragraphs: Vec<Paragraph>,
}

impl TextDocument {
    /// Split text into paragraphs on blank lines
    pub fn parse(content: &str) -> Self {
        let content = content.replace("\r\n", "\n");
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(Paragraph::new(&current.join("\n")));
                    current.clear();
                }
            } else {
                current.push(line.trim_end());
            }
        }
        if !current.is_empty() {
            paragraphs.push(Paragraph::new(&current.join("\n")));
        }

        Self { paragraphs }
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let document = Self::parse(&content);
        info!("Loaded {} paragraphs from {}", document.paragraphs.len(), path.display());
        Ok(document)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<div class=\"translated-document\">\n");
        for paragraph in &self.paragraphs {
            paragraph.render(&mut out);
        }
        out.push_str("</div>\n");
        out
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render()).await?;
        info!("Translated document written to {}", path.display());
        Ok(())
    }
}
