//! PDF text extraction and section splitting
//!
//! Papers are split on the usual headers (Abstract, Introduction, Methods,
//! Results, Conclusion, References) when they appear alone on a line.
//! References are dropped. A paper with no recognizable header becomes a
//! single capped "Full Content" section.

use indexmap::IndexMap;
use lopdf::Document;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Headers looked for, in canonical spelling
pub const SECTION_HEADERS: [&str; 6] = [
    "Abstract",
    "Introduction",
    "Methods",
    "Results",
    "Conclusion",
    "References",
];

/// Sections that make up the model context when present
pub const CONTEXT_SECTIONS: [&str; 3] = ["Abstract", "Introduction", "Conclusion"];

/// Name of the fallback section
pub const FULL_CONTENT: &str = "Full Content";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to load PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("No text content found in {0}")]
    NoText(PathBuf),

    #[error("Invalid section pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Section name -> text, in order of appearance
pub type Sections = IndexMap<String, String>;

/// Source of sectioned paper text
pub trait TextExtractor: Send + Sync {
    fn extract_sections(&self, path: &Path) -> ExtractResult<Sections>;
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Text handed to the tree generator: Abstract, Introduction and Conclusion
/// joined by blank lines, or every section joined and capped at `max_chars`
/// when none of those exist.
pub fn context_text(sections: &Sections, max_chars: usize) -> String {
    let parts: Vec<&str> = CONTEXT_SECTIONS
        .iter()
        .filter_map(|name| sections.get(*name).map(String::as_str))
        .collect();

    if !parts.is_empty() {
        return parts.join("\n\n");
    }

    let all = sections.values().map(String::as_str).collect::<Vec<_>>().join("\n\n");
    truncate_chars(&all, max_chars).to_string()
}

/// Splits raw paper text into named sections
#[derive(Debug, Clone)]
pub struct SectionSplitter {
    headers: Vec<(&'static str, Regex)>,
    full_text_cap: usize,
}

impl SectionSplitter {
    pub fn new(full_text_cap: usize) -> ExtractResult<Self> {
        let headers = SECTION_HEADERS
            .iter()
            .map(|name| Ok((*name, Regex::new(&format!(r"(?im)^[ \t]*{}[ \t\r]*$", name))?)))
            .collect::<ExtractResult<Vec<_>>>()?;
        Ok(Self {
            headers,
            full_text_cap,
        })
    }

    pub fn split(&self, text: &str) -> Sections {
        // (header start, header end, name) for the first match of each header
        let mut positions: Vec<(usize, usize, &str)> = self
            .headers
            .iter()
            .filter_map(|(name, re)| re.find(text).map(|m| (m.start(), m.end(), *name)))
            .collect();
        positions.sort();

        let mut sections = Sections::new();
        for (i, &(_, body_start, name)) in positions.iter().enumerate() {
            if name == "References" {
                continue;
            }
            let body_end = positions.get(i + 1).map(|p| p.0).unwrap_or(text.len());
            let body = text[body_start..body_end].trim();
            if !body.is_empty() {
                sections.insert(name.to_string(), body.to_string());
            }
        }

        if sections.is_empty() {
            sections.insert(
                FULL_CONTENT.to_string(),
                truncate_chars(text, self.full_text_cap).to_string(),
            );
        }
        sections
    }
}

/// Text extraction through `lopdf`
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    splitter: SectionSplitter,
}

impl PdfTextExtractor {
    pub fn new(full_text_cap: usize) -> ExtractResult<Self> {
        Ok(Self {
            splitter: SectionSplitter::new(full_text_cap)?,
        })
    }

    /// Plain text of every page in page order
    pub fn extract_text(&self, path: &Path) -> ExtractResult<String> {
        let doc = Document::load(path).map_err(|e| ExtractError::Pdf {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let pages = doc.get_pages();
        let mut page_numbers: Vec<u32> = pages.keys().copied().collect();
        page_numbers.sort();

        let mut text = String::new();
        for page_num in page_numbers {
            if let Ok(page_text) = doc.extract_text(&[page_num]) {
                text.push_str(&page_text);
                text.push('\n');
            }
        }

        if text.trim().is_empty() {
            return Err(ExtractError::NoText(path.to_path_buf()));
        }
        debug!(path = %path.display(), chars = text.len(), "extracted PDF text");
        Ok(text)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_sections(&self, path: &Path) -> ExtractResult<Sections> {
        let text = self.extract_text(path)?;
        Ok(self.splitter.split(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = "Attention Is All You Need\n\
        ABSTRACT\n\
        We propose the Transformer.\n\
        1 Introduction is not a header here\n\
        Introduction\n\
        Recurrent models are slow.\n\
        Methods  \n\
        Multi-head attention.\n\
        Conclusion\n\
        Attention suffices.\n\
        References\n\
        [1] Bahdanau et al.\n";

    fn splitter() -> SectionSplitter {
        SectionSplitter::new(10_000).unwrap()
    }

    #[test]
    fn test_split_sections() {
        let sections = splitter().split(PAPER);
        let names: Vec<&str> = sections.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Abstract", "Introduction", "Methods", "Conclusion"]);
        assert_eq!(sections["Abstract"], "We propose the Transformer.\n1 Introduction is not a header here");
        assert_eq!(sections["Conclusion"], "Attention suffices.");
        assert!(!sections.contains_key("References"));
    }

    #[test]
    fn test_full_content_fallback() {
        let splitter = SectionSplitter::new(5).unwrap();
        let sections = splitter.split("no headers at all");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[FULL_CONTENT], "no he");
    }

    #[test]
    fn test_context_prefers_key_sections() {
        let sections = splitter().split(PAPER);
        assert_eq!(
            context_text(&sections, 8000),
            "We propose the Transformer.\n1 Introduction is not a header here\n\n\
             Recurrent models are slow.\n\nAttention suffices."
        );
    }

    #[test]
    fn test_context_fallback_capped() {
        let mut sections = Sections::new();
        sections.insert("Methods".to_string(), "abc".to_string());
        sections.insert("Results".to_string(), "défg".to_string());
        assert_eq!(context_text(&sections, 6), "abc\n\nd");
        assert_eq!(context_text(&sections, 100), "abc\n\ndéfg");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_missing_pdf() {
        let extractor = PdfTextExtractor::new(10_000).unwrap();
        let err = extractor
            .extract_sections(Path::new("/definitely/not/here.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Pdf { .. }));
    }
}
