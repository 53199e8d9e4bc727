//! Recognized-text normalization.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Cleans up raw OCR output.
///
/// Applies Unicode NFC, drops replacement and control characters, collapses
/// horizontal whitespace runs, trims every line and removes blank lines.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    spaces: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        let spaces = Regex::new(r"[\p{Zs}\t]+")
            .map_err(|e| Error::Other(format!("invalid whitespace pattern: {}", e)))?;
        Ok(Self { spaces })
    }

    pub fn normalize(&self, text: &str) -> String {
        let composed: String = text
            .nfc()
            .filter(|c| *c == '\n' || *c == '\t' || (!c.is_control() && *c != '\u{FFFD}'))
            .collect();

        composed
            .lines()
            .map(|line| self.spaces.replace_all(line, " ").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfc_composition() {
        let normalizer = TextNormalizer::new().unwrap();
        assert_eq!(normalizer.normalize("e\u{0301}t\u{0065}\u{0301}"), "\u{00E9}t\u{00E9}");
    }

    #[test]
    fn test_whitespace_and_blank_lines() {
        let normalizer = TextNormalizer::new().unwrap();
        let raw = "  Total \t  due\u{00A0}\u{00A0}now \n\n \n 42.00\r\n";
        assert_eq!(normalizer.normalize(raw), "Total due now\n42.00");
    }

    #[test]
    fn test_drops_replacement_characters() {
        let normalizer = TextNormalizer::new().unwrap();
        assert_eq!(normalizer.normalize("ab\u{FFFD}c\u{0007}"), "abc");
    }
}
