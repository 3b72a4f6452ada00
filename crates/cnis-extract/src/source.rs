//! Text sources: turn an uploaded document into ordered, trimmed fragments.
//!
//! Decoding rendered PDF pages is left to an upstream page-text layer; the
//! sources here accept what that layer hands over.

use cnis_core::{Error, Result};

/// Produces the ordered fragment sequence of a document.
pub trait TextSource: Send + Sync {
    fn fragments(&self, document: &[u8]) -> Result<Vec<String>>;
}

/// UTF-8 text, one fragment per non-empty line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn fragments(&self, document: &[u8]) -> Result<Vec<String>> {
        if document.starts_with(b"%PDF") {
            if contains(document, b"/Encrypt") {
                return Err(Error::PasswordProtected);
            }
            return Err(Error::SourceRead(
                "binary PDF needs page-text retrieval before extraction".into(),
            ));
        }

        let text = std::str::from_utf8(document)
            .map_err(|e| Error::SourceRead(format!("document is not valid UTF-8: {}", e)))?;

        Ok(clean_fragments(text.lines()))
    }
}

/// A JSON array of strings, as produced by a page-text retrieval layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFragmentsSource;

impl TextSource for JsonFragmentsSource {
    fn fragments(&self, document: &[u8]) -> Result<Vec<String>> {
        let items: Vec<String> = serde_json::from_slice(document)
            .map_err(|e| Error::SourceRead(format!("invalid fragment list: {}", e)))?;
        Ok(clean_fragments(items))
    }
}

/// Trim every fragment and drop the ones left empty.
pub fn clean_fragments<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| {
            let item = item.as_ref().trim();
            (!item.is_empty()).then(|| item.to_string())
        })
        .collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
