//! Paragraph types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// Position of a text block relative to the tables on its page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphType {
    /// Entirely above the topmost table
    Header,
    /// Entirely below the bottommost table
    Footer,
    /// Body text (beside or between tables, or on a page without tables)
    #[default]
    #[serde(rename = "none")]
    Body,
}

/// A multi-line text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Block extent in page pixels (already padded by the detection margin)
    pub bbox: BBox,

    /// Header/footer/body classification, assigned once at detection
    #[serde(rename = "type")]
    pub paragraph_type: ParagraphType,

    /// Recognized text (empty until recognition runs)
    pub text: String,

    /// Recognized sub-elements (words, lines) in page pixels
    pub blobs: Vec<BBox>,
}

impl Paragraph {
    /// Create a new paragraph without text.
    pub fn new(bbox: BBox, paragraph_type: ParagraphType) -> Self {
        Self {
            bbox,
            paragraph_type,
            text: String::new(),
            blobs: Vec::new(),
        }
    }

    /// Create a paragraph with text.
    pub fn with_text(bbox: BBox, paragraph_type: ParagraphType, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(bbox, paragraph_type)
        }
    }

    pub fn is_header(&self) -> bool {
        self.paragraph_type == ParagraphType::Header
    }

    pub fn is_footer(&self) -> bool {
        self.paragraph_type == ParagraphType::Footer
    }

    /// Check if this is body text (neither header nor footer).
    pub fn is_body(&self) -> bool {
        self.paragraph_type == ParagraphType::Body
    }

    /// Check if the paragraph has no recognized text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_kinds() {
        let p = Paragraph::new(BBox::new(0, 0, 10, 10), ParagraphType::Header);
        assert!(p.is_header());
        assert!(!p.is_body());
        assert!(p.is_empty());
    }

    #[test]
    fn test_type_serializes_lowercase() {
        let p = Paragraph::with_text(BBox::new(0, 0, 1, 1), ParagraphType::Body, "x");
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"type\":\"none\""));

        let footer = serde_json::to_string(&ParagraphType::Footer).unwrap();
        assert_eq!(footer, "\"footer\"");
    }
}
